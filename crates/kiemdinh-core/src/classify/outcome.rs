use crate::model::{AnalysisValue, CropType, Limit, Status};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Classification result for a single contaminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminantResult {
    /// Canonical contaminant key.
    pub contaminant: String,
    pub display_name: String,
    pub unit: String,
    /// The measured, not-detected or below-detection value.
    pub value: AnalysisValue,
    pub status: Status,
    /// The limit that was applied.
    pub limit: Limit,
    /// True if a below-detection value could hide an exceedance.
    pub uncertain: bool,
    /// Human-readable explanation of the classification.
    pub reason: String,
}

/// Why an input did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No contaminant with this key exists in the rule table.
    Unknown,
    /// The contaminant is limited for other crop types only.
    NotApplicable,
    /// The contaminant is known but has no limit.
    NoLimit,
    /// NaN or infinite number.
    NotFinite,
    /// `null`, blank, or a placeholder such as "-".
    Empty,
    /// Text that is not a number or lab marker, or a negative value.
    Invalid { detail: String },
    /// Another input normalized to the same key.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredInput {
    /// Key as submitted.
    pub key: String,
    pub reason: IgnoreReason,
}

/// Evaluation of one measurement set for one crop type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Resolved crop type; `None` if the label was not recognised.
    pub crop: Option<CropType>,
    /// Per-contaminant results, only for applicable contaminants with a value.
    pub results: BTreeMap<String, ContaminantResult>,
    /// Inputs that produced no result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<IgnoredInput>,
    /// Applicable contaminants with no measurement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_measured: Vec<String>,
}

impl Evaluation {
    /// Worst status across all results.
    pub fn worst(&self) -> Option<Status> {
        self.results.values().map(|r| r.status).max()
    }

    /// Compact wire form: `{ key: { status, limit } }`.
    pub fn to_wire(&self) -> BTreeMap<String, WireResult> {
        self.results
            .iter()
            .map(|(k, r)| {
                let limit = match r.limit {
                    Limit::Zero => WireLimit::Zero,
                    Limit::Banded { danger, .. } => WireLimit::Danger(danger),
                };
                (
                    k.clone(),
                    WireResult {
                        status: r.status,
                        limit,
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireResult {
    pub status: Status,
    pub limit: WireLimit,
}

/// Serialized as the danger limit number, or the string `"zero"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireLimit {
    Zero,
    Danger(Decimal),
}

impl Serialize for WireLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WireLimit::Zero => serializer.serialize_str("zero"),
            WireLimit::Danger(d) => rust_decimal::serde::float::serialize(d, serializer),
        }
    }
}

/// Inspection grade derived from the worst status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "Grade 1")]
    One,
    #[serde(rename = "Grade 2")]
    Two,
    #[serde(rename = "Grade 3")]
    Three,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::One => write!(f, "Grade 1"),
            Grade::Two => write!(f, "Grade 2"),
            Grade::Three => write!(f, "Grade 3"),
        }
    }
}

/// Overall pass/fail verdict for an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// `None` when nothing was evaluated.
    pub grade: Option<Grade>,
    pub passed: bool,
    pub reason: String,
    /// Contaminant(s) at the worst status.
    pub determining: Vec<String>,
}

/// Result of a replicate sampling plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEvaluation {
    pub contaminant: String,
    pub unit: String,
    pub status: Status,
    pub grade: Grade,
    /// Samples in the marginal band `[m, M)`.
    pub marginal: usize,
    /// Samples at or above `M`.
    pub rejected: usize,
    pub max_marginal: usize,
    pub marginal_limit: Decimal,
    pub reject_limit: Decimal,
    pub reason: String,
}
