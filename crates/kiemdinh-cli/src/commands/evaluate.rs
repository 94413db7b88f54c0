use kiemdinh_core::classify::outcome::{Evaluation, Verdict};
use kiemdinh_core::error::KiemdinhError;
use kiemdinh_core::model::EvaluationRequest;
use serde::Serialize;
use std::path::PathBuf;

use crate::output;

/// One evaluated request, as printed.
#[derive(Serialize)]
pub struct EvaluatedRequest {
    /// Crop label as given, before resolution.
    pub crop_type: Option<String>,
    pub evaluation: Evaluation,
    pub verdict: Verdict,
}

pub fn run(
    input_file: PathBuf,
    crop: Option<String>,
    rules_file: Option<PathBuf>,
    preset: &str,
    output_format: &str,
    show_all: bool,
    verbose: bool,
) -> Result<(), KiemdinhError> {
    let table = kiemdinh_core::load_rule_table(rules_file.as_deref(), preset)?;

    let json_bytes = std::fs::read(&input_file)?;
    // One request object or an array of them.
    let raw: serde_json::Value = serde_json::from_slice(&json_bytes)?;
    let mut requests: Vec<EvaluationRequest> = if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        vec![serde_json::from_value(raw)?]
    };

    tracing::debug!(
        requests = requests.len(),
        ruleset = table.name(),
        "evaluating request file"
    );

    if let Some(label) = crop {
        for request in &mut requests {
            request.crop_type = Some(label.clone());
        }
    }

    let results = requests
        .iter()
        .map(|request| {
            let evaluation = kiemdinh_core::evaluate_request(&table, request)?;
            let verdict = kiemdinh_core::classify::verdict(&evaluation);
            Ok(EvaluatedRequest {
                crop_type: request.crop_type.clone(),
                evaluation,
                verdict,
            })
        })
        .collect::<Result<Vec<_>, KiemdinhError>>()?;

    match output_format {
        "json" => output::json::print(&results)?,
        _ => output::table::print_evaluations(&table, &results, show_all, verbose),
    }

    Ok(())
}
