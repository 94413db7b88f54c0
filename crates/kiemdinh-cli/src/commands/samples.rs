use kiemdinh_core::error::KiemdinhError;
use kiemdinh_core::parsing::normalize::normalize_contaminant;
use kiemdinh_core::parsing::values::parse_value;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::output;

pub fn run(
    contaminant: &str,
    values: &[String],
    rules_file: Option<PathBuf>,
    preset: &str,
    output_format: &str,
) -> Result<(), KiemdinhError> {
    let table = kiemdinh_core::load_rule_table(rules_file.as_deref(), preset)?;
    let key = normalize_contaminant(contaminant);

    let counts = values
        .iter()
        .map(|raw| match parse_value(raw)? {
            Some(value) if !value.is_below_detection() => Ok(value.numeric()),
            _ => Err(KiemdinhError::InvalidInput(format!(
                "sample value '{raw}' is not a count"
            ))),
        })
        .collect::<Result<Vec<Decimal>, _>>()?;

    let result = kiemdinh_core::classify::evaluate_samples(&table, &key, &counts)?;

    match output_format {
        "json" => output::json::print(&result)?,
        _ => output::table::print_samples(&result),
    }

    Ok(())
}
