use crate::model::CropType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ruleset defining contaminant limits for inspected produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Regulation(s) the limits were pinned from.
    #[serde(default)]
    pub source: Option<String>,
    pub contaminants: Vec<ContaminantDef>,
    #[serde(default)]
    pub groups: Vec<ContaminantGroupDef>,
    /// Rules that apply regardless of crop type.
    pub common: Vec<ThresholdRuleDef>,
    /// Crop-dependent rules, keyed by crop type.
    #[serde(default)]
    pub crops: BTreeMap<CropType, Vec<ThresholdRuleDef>>,
    #[serde(default)]
    pub sampling_plans: Vec<SamplingPlanDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminantDef {
    pub key: String,
    pub display_name: String,
    pub unit: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Display bucket for contaminants. Members of a `crop_dependent` group are
/// only ever limited through crop overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminantGroupDef {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub crop_dependent: bool,
    pub contaminants: Vec<String>,
}

/// Limits for one contaminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRuleDef {
    pub contaminant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger: Option<Decimal>,
    /// Zero tolerance; takes precedence over numeric limits.
    #[serde(default)]
    pub must_be_zero: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// Replicate-count acceptance plan (n samples, at most c marginal ones).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingPlanDef {
    pub contaminant: String,
    /// Number of replicate samples (n).
    pub samples: usize,
    /// Maximum number of samples allowed in the marginal band (c).
    pub max_marginal: usize,
    /// Lower bound of the marginal band (m).
    pub marginal: Decimal,
    /// Rejection limit (M).
    pub reject: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}
