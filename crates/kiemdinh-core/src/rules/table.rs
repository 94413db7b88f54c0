use crate::error::KiemdinhError;
use crate::model::{CropType, Limit};
use crate::rules::schema::{
    ContaminantDef, ContaminantGroupDef, RuleSetDef, SamplingPlanDef, ThresholdRuleDef,
};
use crate::rules::validate_ruleset;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A resolved limit for one contaminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdRule {
    pub contaminant: String,
    pub limit: Limit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ThresholdRule {
    pub fn must_be_zero(&self) -> bool {
        matches!(self.limit, Limit::Zero)
    }

    fn from_def(def: &ThresholdRuleDef) -> Result<Self, KiemdinhError> {
        let limit = if def.must_be_zero {
            Limit::Zero
        } else {
            match (def.warning, def.danger) {
                (Some(warning), Some(danger)) => Limit::Banded { warning, danger },
                _ => {
                    return Err(KiemdinhError::RulesetInvalid(format!(
                        "contaminant '{}' has no limits",
                        def.contaminant
                    )))
                }
            }
        };
        Ok(ThresholdRule {
            contaminant: def.contaminant.clone(),
            limit,
            note: def.note.clone(),
        })
    }
}

/// Validated, indexed rule table. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct RuleTable {
    def: RuleSetDef,
    contaminants: HashMap<String, usize>,
    groups: HashMap<String, usize>,
    common: Vec<ThresholdRule>,
    crops: BTreeMap<CropType, Vec<ThresholdRule>>,
    plans: HashMap<String, usize>,
}

impl RuleTable {
    pub fn new(def: RuleSetDef) -> Result<Self, KiemdinhError> {
        validate_ruleset(&def)?;

        let contaminants = def
            .contaminants
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.clone(), i))
            .collect();

        let groups = def
            .groups
            .iter()
            .enumerate()
            .flat_map(|(i, g)| g.contaminants.iter().map(move |k| (k.clone(), i)))
            .collect();

        let common = def
            .common
            .iter()
            .map(ThresholdRule::from_def)
            .collect::<Result<Vec<_>, _>>()?;

        let mut crops = BTreeMap::new();
        for (crop, rules) in &def.crops {
            let resolved = rules
                .iter()
                .map(ThresholdRule::from_def)
                .collect::<Result<Vec<_>, _>>()?;
            crops.insert(*crop, resolved);
        }

        let plans = def
            .sampling_plans
            .iter()
            .enumerate()
            .map(|(i, p)| (p.contaminant.clone(), i))
            .collect();

        tracing::debug!(
            ruleset = %def.name,
            version = %def.version,
            common = def.common.len(),
            crops = def.crops.len(),
            "rule table compiled"
        );

        Ok(RuleTable {
            def,
            contaminants,
            groups,
            common,
            crops,
            plans,
        })
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn version(&self) -> &str {
        &self.def.version
    }

    pub fn source(&self) -> Option<&str> {
        self.def.source.as_deref()
    }

    pub fn definition(&self) -> &RuleSetDef {
        &self.def
    }

    pub fn contaminant(&self, key: &str) -> Option<&ContaminantDef> {
        self.contaminants
            .get(key)
            .map(|&i| &self.def.contaminants[i])
    }

    pub fn unit(&self, key: &str) -> Option<&str> {
        self.contaminant(key).map(|c| c.unit.as_str())
    }

    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.contaminant(key).map(|c| c.display_name.as_str())
    }

    /// Explanation for a rule: its own note, else the contaminant's.
    pub fn note<'a>(&'a self, rule: &'a ThresholdRule) -> Option<&'a str> {
        rule.note
            .as_deref()
            .or_else(|| self.contaminant(&rule.contaminant)?.note.as_deref())
    }

    pub fn groups(&self) -> &[ContaminantGroupDef] {
        &self.def.groups
    }

    pub fn group_of(&self, key: &str) -> Option<&ContaminantGroupDef> {
        self.groups.get(key).map(|&i| &self.def.groups[i])
    }

    pub fn is_crop_dependent(&self, key: &str) -> bool {
        self.group_of(key).is_some_and(|g| g.crop_dependent)
    }

    /// Crop-dependent contaminants that apply to `crop`.
    pub fn crop_contaminants(&self, crop: Option<CropType>) -> Vec<&str> {
        self.crop_rules(crop)
            .iter()
            .map(|r| r.contaminant.as_str())
            .collect()
    }

    /// Common rules followed by the crop's overrides.
    pub fn applicable_rules(&self, crop: Option<CropType>) -> impl Iterator<Item = &ThresholdRule> {
        self.common.iter().chain(self.crop_rules(crop).iter())
    }

    pub fn rule(&self, key: &str, crop: Option<CropType>) -> Option<&ThresholdRule> {
        self.applicable_rules(crop).find(|r| r.contaminant == key)
    }

    /// True if `key` has a rule for at least one crop type.
    pub fn has_any_rule(&self, key: &str) -> bool {
        self.common.iter().any(|r| r.contaminant == key)
            || self
                .crops
                .values()
                .any(|rules| rules.iter().any(|r| r.contaminant == key))
    }

    pub fn sampling_plan(&self, key: &str) -> Option<&SamplingPlanDef> {
        self.plans.get(key).map(|&i| &self.def.sampling_plans[i])
    }

    fn crop_rules(&self, crop: Option<CropType>) -> &[ThresholdRule] {
        crop.and_then(|c| self.crops.get(&c))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
