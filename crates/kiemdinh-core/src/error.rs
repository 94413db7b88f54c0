use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum KiemdinhError {
    #[error("failed to load ruleset from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("invalid ruleset: {0}")]
    RulesetInvalid(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("no sampling plan defined for contaminant '{0}'")]
    NoSamplingPlan(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
