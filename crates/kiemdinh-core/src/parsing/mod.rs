pub mod normalize;
pub mod values;

use crate::classify::outcome::{IgnoreReason, IgnoredInput};
use crate::error::KiemdinhError;
use crate::model::{MeasurementInput, MeasurementSet, Measurements};
use std::collections::HashMap;
use normalize::normalize_contaminant;
use values::{from_number, parse_value};

/// Measurements ready for evaluation, plus the inputs that were dropped.
#[derive(Debug, Clone, Default)]
pub struct PreparedMeasurements {
    pub values: Measurements,
    pub ignored: Vec<IgnoredInput>,
}

/// Normalize keys and parse values of a submitted measurement set.
///
/// Missing, non-finite and unparseable values are dropped and recorded, never
/// turned into a measurement. A number that is negative or beyond the decimal
/// range fails the whole set with `InvalidInput`. When several keys normalize
/// to the same contaminant, the key already in canonical form wins.
pub fn prepare_measurements(raw: &MeasurementSet) -> Result<PreparedMeasurements, KiemdinhError> {
    let mut prepared = PreparedMeasurements::default();
    // canonical key -> submitted key that supplied the value
    let mut origin: HashMap<String, &str> = HashMap::new();

    for (key, input) in raw {
        let canonical = normalize_contaminant(key);

        let parsed = match input {
            None => Err(IgnoreReason::Empty),
            Some(MeasurementInput::Number(v)) if !v.is_finite() => Err(IgnoreReason::NotFinite),
            Some(MeasurementInput::Number(v)) => Ok(from_number(*v).map_err(|e| rejected(key, e))?),
            Some(MeasurementInput::Text(s)) => match parse_value(s) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Err(IgnoreReason::Empty),
                Err(e @ KiemdinhError::OutOfRange(_)) => return Err(rejected(key, e)),
                Err(e) => Err(IgnoreReason::Invalid {
                    detail: e.to_string(),
                }),
            },
        };

        let (dropped, reason) = match parsed {
            Ok(value) => match origin.get(&canonical).copied() {
                None => {
                    origin.insert(canonical.clone(), key);
                    prepared.values.insert(canonical, value);
                    continue;
                }
                Some(previous) if *key == canonical && previous != canonical => {
                    origin.insert(canonical.clone(), key);
                    prepared.values.insert(canonical, value);
                    (previous.to_string(), IgnoreReason::Duplicate)
                }
                Some(_) => (key.clone(), IgnoreReason::Duplicate),
            },
            Err(reason) => (key.clone(), reason),
        };

        tracing::debug!(key = %dropped, ?reason, "measurement dropped");
        prepared.ignored.push(IgnoredInput {
            key: dropped,
            reason,
        });
    }

    Ok(prepared)
}

fn rejected(key: &str, e: KiemdinhError) -> KiemdinhError {
    KiemdinhError::InvalidInput(format!("measurement '{key}': {e}"))
}
