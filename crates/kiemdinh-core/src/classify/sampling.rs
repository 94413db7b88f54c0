use crate::classify::outcome::{Grade, SampleEvaluation};
use crate::error::KiemdinhError;
use crate::model::Status;
use crate::rules::RuleTable;
use rust_decimal::Decimal;

/// Evaluate replicate counts against a contaminant's sampling plan.
///
/// Any sample at or above the rejection limit fails the lot. Otherwise the
/// number of samples in the marginal band `[m, M)` decides: none is OK, up to
/// `max_marginal` is a Warning, more is Danger.
pub fn evaluate_samples(
    table: &RuleTable,
    contaminant: &str,
    values: &[Decimal],
) -> Result<SampleEvaluation, KiemdinhError> {
    let plan = table
        .sampling_plan(contaminant)
        .ok_or_else(|| KiemdinhError::NoSamplingPlan(contaminant.to_string()))?;

    if values.len() != plan.samples {
        return Err(KiemdinhError::InvalidInput(format!(
            "sampling plan for '{}' needs exactly {} samples, got {}",
            contaminant,
            plan.samples,
            values.len()
        )));
    }
    if let Some(v) = values.iter().find(|v| v.is_sign_negative() && !v.is_zero()) {
        return Err(KiemdinhError::InvalidInput(format!(
            "negative sample value {v} for '{contaminant}'"
        )));
    }

    let rejected = values.iter().filter(|v| **v >= plan.reject).count();
    let marginal = values
        .iter()
        .filter(|v| **v >= plan.marginal && **v < plan.reject)
        .count();
    let unit = table.unit(contaminant).unwrap_or_default().to_string();

    let (status, reason) = if rejected > 0 {
        (
            Status::Danger,
            format!(
                "{} of {} samples >= {} {} -> Danger",
                rejected, plan.samples, plan.reject, unit
            ),
        )
    } else if marginal == 0 {
        (
            Status::Ok,
            format!("all {} samples < {} {} -> OK", plan.samples, plan.marginal, unit),
        )
    } else if marginal <= plan.max_marginal {
        (
            Status::Warning,
            format!(
                "{} of {} samples in [{}, {}) {}, at most {} allowed -> Warning",
                marginal, plan.samples, plan.marginal, plan.reject, unit, plan.max_marginal
            ),
        )
    } else {
        (
            Status::Danger,
            format!(
                "{} of {} samples in [{}, {}) {}, more than {} allowed -> Danger",
                marginal, plan.samples, plan.marginal, plan.reject, unit, plan.max_marginal
            ),
        )
    };

    let grade = match status {
        Status::Ok => Grade::One,
        Status::Warning => Grade::Two,
        Status::Danger => Grade::Three,
    };

    tracing::debug!(contaminant, marginal, rejected, %status, "sampling plan evaluated");

    Ok(SampleEvaluation {
        contaminant: contaminant.to_string(),
        unit,
        status,
        grade,
        marginal,
        rejected,
        max_marginal: plan.max_marginal,
        marginal_limit: plan.marginal,
        reject_limit: plan.reject,
        reason,
    })
}
