pub mod classify;
pub mod error;
pub mod model;
pub mod parsing;
pub mod rules;

use classify::outcome::Evaluation;
use error::KiemdinhError;
use model::EvaluationRequest;
use rules::RuleTable;
use std::path::Path;

/// Main API entry point: evaluate a submitted measurement set.
///
/// The crop label is resolved once; unknown labels apply only the common
/// rules. Inputs dropped while parsing are reported alongside the ones the
/// evaluator could not match to a rule. A numeric value that cannot be
/// represented (negative or out of range) fails with `InvalidInput`.
pub fn evaluate_request(
    table: &RuleTable,
    request: &EvaluationRequest,
) -> Result<Evaluation, KiemdinhError> {
    let prepared = parsing::prepare_measurements(&request.measurements)?;
    let mut evaluation = match request.crop_type.as_deref() {
        Some(label) => classify::evaluate_label(table, label, &prepared.values),
        None => classify::evaluate(table, None, &prepared.values),
    };

    evaluation.ignored.extend(prepared.ignored);
    evaluation.ignored.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(evaluation)
}

/// Load the rule table from a file if given, otherwise from a built-in preset.
pub fn load_rule_table(rules_file: Option<&Path>, preset: &str) -> Result<RuleTable, KiemdinhError> {
    let def = match rules_file {
        Some(path) => rules::load_ruleset(path)?,
        None => rules::builtin::load_preset(preset)?,
    };
    RuleTable::new(def)
}
