use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Crop category under inspection. Heavy-metal limits depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Cruciferous,
    Allium,
    Leafy,
    Fruiting,
    Root,
    Stem,
    Mushroom,
    Legume,
    MixedProduce,
    Dried,
}

impl CropType {
    pub const ALL: [CropType; 10] = [
        CropType::Cruciferous,
        CropType::Allium,
        CropType::Leafy,
        CropType::Fruiting,
        CropType::Root,
        CropType::Stem,
        CropType::Mushroom,
        CropType::Legume,
        CropType::MixedProduce,
        CropType::Dried,
    ];

    /// Stable identifier used in rule files and URLs.
    pub fn id(&self) -> &'static str {
        match self {
            CropType::Cruciferous => "cruciferous",
            CropType::Allium => "allium",
            CropType::Leafy => "leafy",
            CropType::Fruiting => "fruiting",
            CropType::Root => "root",
            CropType::Stem => "stem",
            CropType::Mushroom => "mushroom",
            CropType::Legume => "legume",
            CropType::MixedProduce => "mixed_produce",
            CropType::Dried => "dried",
        }
    }

    /// Label as entered on inspection forms.
    pub fn label(&self) -> &'static str {
        match self {
            CropType::Cruciferous => "Rau họ thập tự",
            CropType::Allium => "Hành",
            CropType::Leafy => "Rau ăn lá",
            CropType::Fruiting => "Rau ăn quả",
            CropType::Root => "Rau ăn củ",
            CropType::Stem => "Rau ăn thân",
            CropType::Mushroom => "Nấm",
            CropType::Legume => "Rau họ đậu",
            CropType::MixedProduce => "Rau củ quả",
            CropType::Dried => "Rau khô",
        }
    }

    /// Resolve a form label or identifier. Unknown input yields `None`.
    pub fn from_str_loose(s: &str) -> Option<CropType> {
        let lower = s.trim().nfc().collect::<String>().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        CropType::ALL
            .into_iter()
            .find(|c| c.id() == lower || c.label().to_lowercase() == lower)
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisValue {
    Measured(Decimal),
    /// Reported by the lab as not detected; evaluated as zero.
    NotDetected,
    BelowDetection(Decimal),
}

impl AnalysisValue {
    /// Returns the numeric value (the measurement, zero, or the detection limit).
    pub fn numeric(&self) -> Decimal {
        match self {
            AnalysisValue::Measured(v) => *v,
            AnalysisValue::NotDetected => Decimal::ZERO,
            AnalysisValue::BelowDetection(v) => *v,
        }
    }

    pub fn is_below_detection(&self) -> bool {
        matches!(self, AnalysisValue::BelowDetection(_))
    }
}

impl fmt::Display for AnalysisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisValue::Measured(v) => write!(f, "{v}"),
            AnalysisValue::NotDetected => write!(f, "KPH"),
            AnalysisValue::BelowDetection(v) => write!(f, "< {v}"),
        }
    }
}

/// Classification of a single measurement. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Danger,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "Warning"),
            Status::Danger => write!(f, "Danger"),
        }
    }
}

/// Limit applied to a contaminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Limit {
    Zero,
    Banded { warning: Decimal, danger: Decimal },
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Zero => write!(f, "= 0"),
            Limit::Banded { warning, danger } => write!(f, "warning {warning}, danger {danger}"),
        }
    }
}

/// A measurement as submitted: a JSON number or a lab text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementInput {
    Number(f64),
    Text(String),
}

impl From<f64> for MeasurementInput {
    fn from(v: f64) -> Self {
        MeasurementInput::Number(v)
    }
}

impl From<&str> for MeasurementInput {
    fn from(v: &str) -> Self {
        MeasurementInput::Text(v.to_string())
    }
}

/// Raw measurements keyed by contaminant name, one set per inspection record.
pub type MeasurementSet = BTreeMap<String, Option<MeasurementInput>>;

/// Parsed measurements keyed by canonical contaminant key.
pub type Measurements = BTreeMap<String, AnalysisValue>;

/// An evaluation request as submitted by the inspection backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub measurements: MeasurementSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_from_label() {
        assert_eq!(CropType::from_str_loose("Rau ăn lá"), Some(CropType::Leafy));
        assert_eq!(CropType::from_str_loose("  Hành "), Some(CropType::Allium));
        assert_eq!(CropType::from_str_loose("RAU KHÔ"), Some(CropType::Dried));
    }

    #[test]
    fn test_crop_from_decomposed_label() {
        assert_eq!(
            CropType::from_str_loose("Rau a\u{306}n la\u{301}"),
            Some(CropType::Leafy)
        );
        assert_eq!(CropType::from_str_loose("Na\u{302}\u{301}m"), Some(CropType::Mushroom));
    }

    #[test]
    fn test_crop_from_id() {
        assert_eq!(
            CropType::from_str_loose("mixed_produce"),
            Some(CropType::MixedProduce)
        );
    }

    #[test]
    fn test_unknown_crop() {
        assert_eq!(CropType::from_str_loose("Rau muống biển"), None);
        assert_eq!(CropType::from_str_loose(""), None);
    }

    #[test]
    fn test_status_ordering() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Danger);
    }

    #[test]
    fn test_status_serializes_upper_ok() {
        assert_eq!(serde_json::to_string(&Status::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&Status::Danger).unwrap(), "\"Danger\"");
    }

    #[test]
    fn test_request_accepts_numbers_text_and_null() {
        let json = r#"{
            "cropType": "Hành",
            "measurements": { "cadmi": 0.04, "salmonella": "KPH", "nitrat": null }
        }"#;
        let req: EvaluationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.crop_type.as_deref(), Some("Hành"));
        assert_eq!(
            req.measurements["cadmi"],
            Some(MeasurementInput::Number(0.04))
        );
        assert_eq!(
            req.measurements["salmonella"],
            Some(MeasurementInput::Text("KPH".into()))
        );
        assert_eq!(req.measurements["nitrat"], None);
    }

    #[test]
    fn test_request_rejects_wrong_types() {
        let json = r#"{ "measurements": { "cadmi": true } }"#;
        assert!(serde_json::from_str::<EvaluationRequest>(json).is_err());
    }
}
