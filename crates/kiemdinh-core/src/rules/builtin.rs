use crate::error::KiemdinhError;
use crate::rules::schema::RuleSetDef;
use crate::rules::validate_ruleset;

const RAU_AN_TOAN_JSON: &str = include_str!("../../../../rules/rau-an-toan.json");

/// Available predefined rulesets.
pub const PRESETS: &[&str] = &["rau"];

/// Preset used when no rules are given.
pub const DEFAULT_PRESET: &str = "rau";

/// Load a predefined ruleset by name.
pub fn load_preset(name: &str) -> Result<RuleSetDef, KiemdinhError> {
    match name {
        "rau" => {
            let ruleset: RuleSetDef = serde_json::from_str(RAU_AN_TOAN_JSON)?;
            validate_ruleset(&ruleset)?;
            Ok(ruleset)
        }
        _ => Err(KiemdinhError::RulesetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
