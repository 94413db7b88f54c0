pub mod engine;
pub mod outcome;
pub mod sampling;

pub use engine::{evaluate, evaluate_label, verdict};
pub use outcome::{ContaminantResult, Evaluation, IgnoreReason, IgnoredInput, Verdict};
pub use sampling::evaluate_samples;
