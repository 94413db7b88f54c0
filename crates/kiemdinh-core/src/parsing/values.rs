use crate::error::KiemdinhError;
use crate::model::AnalysisValue;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Lab markers meaning "analysed, nothing found".
const NOT_DETECTED: &[&str] = &[
    "kph",
    "không phát hiện",
    "khong phat hien",
    "nd",
    "n.d.",
    "not detected",
];

/// Parse a value string from an inspection form into an AnalysisValue.
///
/// Handles formats like:
/// - "0.3" -> Measured(0.3)
/// - "0,05" -> Measured(0.05) (decimal comma)
/// - "1.2e3" -> Measured(1200)
/// - "< 0.01" / "<0,01" -> BelowDetection(0.01)
/// - "KPH", "không phát hiện", "ND" -> NotDetected
/// - "", "*", "-", "N/A" -> None
pub fn parse_value(s: &str) -> Result<Option<AnalysisValue>, KiemdinhError> {
    let s = s.trim();

    if s.is_empty() || s == "*" || s == "-" || s == "—" || s == "n.a." || s == "N/A" {
        return Ok(None);
    }

    let lower = s.to_lowercase();
    if NOT_DETECTED.contains(&lower.as_str()) {
        return Ok(Some(AnalysisValue::NotDetected));
    }

    if let Some(rest) = s.strip_prefix('<') {
        let decimal = parse_decimal(rest)?;
        return Ok(Some(AnalysisValue::BelowDetection(decimal)));
    }

    let decimal = parse_decimal(s)?;
    Ok(Some(AnalysisValue::Measured(decimal)))
}

/// Smallest positive decimal; stands in for non-zero values below decimal precision.
const SMALLEST_POSITIVE: Decimal = Decimal::from_parts(1, 0, 0, false, 28);

/// Convert a finite JSON number into a measured value.
///
/// Negative numbers and numbers beyond the decimal range are `OutOfRange`.
/// A positive number too small to represent stays non-zero.
pub fn from_number(v: f64) -> Result<AnalysisValue, KiemdinhError> {
    if v < 0.0 {
        return Err(KiemdinhError::OutOfRange(format!("negative measurement {v}")));
    }
    let decimal = match Decimal::from_f64(v) {
        Some(d) if d.is_zero() && v != 0.0 => SMALLEST_POSITIVE,
        Some(d) => d,
        None if v.is_finite() && v < 1.0 => SMALLEST_POSITIVE,
        None => {
            return Err(KiemdinhError::OutOfRange(format!(
                "{v} exceeds the largest supported measurement"
            )))
        }
    };
    Ok(AnalysisValue::Measured(decimal))
}

/// Parse a decimal value, accepting decimal commas and scientific notation.
///
/// Text that is a number but not a representable non-negative decimal is
/// `OutOfRange`; anything else that fails to parse is `InvalidInput`.
fn parse_decimal(s: &str) -> Result<Decimal, KiemdinhError> {
    let s = s.trim();
    let normalized = s.replace(',', ".");
    let parsed = if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized)
    } else {
        Decimal::from_str(&normalized)
    };

    match parsed {
        Ok(decimal) => {
            check_non_negative(decimal)?;
            Ok(decimal)
        }
        Err(e) => match normalized.parse::<f64>() {
            Ok(v) if v.is_finite() => match from_number(v)? {
                AnalysisValue::Measured(d) => Ok(d),
                _ => Err(KiemdinhError::InvalidInput(format!("invalid number '{s}'"))),
            },
            _ => Err(KiemdinhError::InvalidInput(format!(
                "invalid number '{}': {}",
                s, e
            ))),
        },
    }
}

fn check_non_negative(d: Decimal) -> Result<(), KiemdinhError> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(KiemdinhError::OutOfRange(format!("negative measurement {d}")));
    }
    Ok(())
}
