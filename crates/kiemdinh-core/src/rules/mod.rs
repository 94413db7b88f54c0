pub mod builtin;
pub mod schema;
pub mod table;

use crate::error::KiemdinhError;
use schema::{RuleSetDef, SamplingPlanDef, ThresholdRuleDef};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub use table::{RuleTable, ThresholdRule};

/// Load a ruleset from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSetDef, KiemdinhError> {
    let content = std::fs::read_to_string(path).map_err(|e| KiemdinhError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_ruleset(&content, path)
}

/// Parse a ruleset from a JSON string.
pub fn parse_ruleset(json: &str, source: &Path) -> Result<RuleSetDef, KiemdinhError> {
    let ruleset: RuleSetDef =
        serde_json::from_str(json).map_err(|e| KiemdinhError::RulesetLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a ruleset from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<RuleSetDef, KiemdinhError> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(KiemdinhError::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a ruleset is well-formed.
pub fn validate_ruleset(ruleset: &RuleSetDef) -> Result<(), KiemdinhError> {
    if ruleset.contaminants.is_empty() {
        return Err(KiemdinhError::RulesetInvalid(
            "contaminants must not be empty".into(),
        ));
    }

    let mut defined = HashSet::new();
    for c in &ruleset.contaminants {
        if c.key.is_empty() {
            return Err(KiemdinhError::RulesetInvalid(
                "contaminant key must not be empty".into(),
            ));
        }
        if !defined.insert(c.key.as_str()) {
            return Err(KiemdinhError::RulesetInvalid(format!(
                "contaminant '{}' is defined more than once",
                c.key
            )));
        }
    }

    // contaminant -> crop_dependent flag of its group
    let mut crop_dependent: HashMap<&str, bool> = HashMap::new();
    for group in &ruleset.groups {
        for key in &group.contaminants {
            if !defined.contains(key.as_str()) {
                return Err(KiemdinhError::RulesetInvalid(format!(
                    "group '{}' references unknown contaminant '{}'",
                    group.key, key
                )));
            }
            if crop_dependent
                .insert(key.as_str(), group.crop_dependent)
                .is_some()
            {
                return Err(KiemdinhError::RulesetInvalid(format!(
                    "contaminant '{}' belongs to more than one group",
                    key
                )));
            }
        }
    }
    let is_crop_dependent = |key: &str| crop_dependent.get(key).copied().unwrap_or(false);

    if ruleset.common.is_empty() && ruleset.crops.values().all(|r| r.is_empty()) {
        return Err(KiemdinhError::RulesetInvalid("rules must not be empty".into()));
    }

    let mut seen = HashSet::new();
    for rule in &ruleset.common {
        validate_rule(rule, &defined, "common rules")?;
        if is_crop_dependent(&rule.contaminant) {
            return Err(KiemdinhError::RulesetInvalid(format!(
                "contaminant '{}' is crop-dependent and cannot have a common rule",
                rule.contaminant
            )));
        }
        if !seen.insert(rule.contaminant.as_str()) {
            return Err(KiemdinhError::RulesetInvalid(format!(
                "contaminant '{}' has more than one common rule",
                rule.contaminant
            )));
        }
    }

    for (crop, rules) in &ruleset.crops {
        let scope = format!("crop '{}'", crop.id());
        let mut seen = HashSet::new();
        for rule in rules {
            validate_rule(rule, &defined, &scope)?;
            if !is_crop_dependent(&rule.contaminant) {
                return Err(KiemdinhError::RulesetInvalid(format!(
                    "{} overrides '{}', which is not in a crop-dependent group",
                    scope, rule.contaminant
                )));
            }
            if !seen.insert(rule.contaminant.as_str()) {
                return Err(KiemdinhError::RulesetInvalid(format!(
                    "{} has more than one rule for '{}'",
                    scope, rule.contaminant
                )));
            }
        }
    }

    let mut planned = HashSet::new();
    for plan in &ruleset.sampling_plans {
        validate_plan(plan, &defined)?;
        if !planned.insert(plan.contaminant.as_str()) {
            return Err(KiemdinhError::RulesetInvalid(format!(
                "contaminant '{}' has more than one sampling plan",
                plan.contaminant
            )));
        }
    }

    Ok(())
}

fn validate_rule(
    rule: &ThresholdRuleDef,
    defined: &HashSet<&str>,
    scope: &str,
) -> Result<(), KiemdinhError> {
    if !defined.contains(rule.contaminant.as_str()) {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "{}: unknown contaminant '{}'",
            scope, rule.contaminant
        )));
    }

    if rule.must_be_zero {
        return Ok(());
    }

    let (Some(warning), Some(danger)) = (rule.warning, rule.danger) else {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "{}: contaminant '{}' needs both warning and danger limits or must_be_zero",
            scope, rule.contaminant
        )));
    };

    if warning.is_sign_negative() || danger.is_sign_negative() {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "{}: contaminant '{}' has a negative limit",
            scope, rule.contaminant
        )));
    }

    if warning > danger {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "{}: contaminant '{}' has warning limit {} above danger limit {}",
            scope, rule.contaminant, warning, danger
        )));
    }

    Ok(())
}

fn validate_plan(plan: &SamplingPlanDef, defined: &HashSet<&str>) -> Result<(), KiemdinhError> {
    if !defined.contains(plan.contaminant.as_str()) {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "sampling plan references unknown contaminant '{}'",
            plan.contaminant
        )));
    }
    if plan.samples == 0 {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "sampling plan for '{}' needs at least one sample",
            plan.contaminant
        )));
    }
    if plan.max_marginal > plan.samples {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "sampling plan for '{}' allows {} marginal samples out of {}",
            plan.contaminant, plan.max_marginal, plan.samples
        )));
    }
    if plan.marginal.is_sign_negative() || plan.marginal > plan.reject {
        return Err(KiemdinhError::RulesetInvalid(format!(
            "sampling plan for '{}' needs 0 <= marginal <= reject",
            plan.contaminant
        )));
    }
    Ok(())
}
