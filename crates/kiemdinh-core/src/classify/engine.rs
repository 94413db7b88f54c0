use crate::classify::outcome::{
    ContaminantResult, Evaluation, Grade, IgnoreReason, IgnoredInput, Verdict,
};
use crate::model::{AnalysisValue, CropType, Limit, Measurements, Status};
use crate::rules::{RuleTable, ThresholdRule};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Evaluate a crop label as entered on the form. Unknown labels apply only
/// the common rules.
pub fn evaluate_label(table: &RuleTable, crop_label: &str, measurements: &Measurements) -> Evaluation {
    let crop = CropType::from_str_loose(crop_label);
    if crop.is_none() && !crop_label.trim().is_empty() {
        tracing::debug!(label = crop_label, "unrecognised crop type, applying common rules only");
    }
    evaluate(table, crop, measurements)
}

/// Classify measurements against the rules applicable to `crop`.
pub fn evaluate(table: &RuleTable, crop: Option<CropType>, measurements: &Measurements) -> Evaluation {
    let mut results = BTreeMap::new();
    let mut not_measured = Vec::new();

    for rule in table.applicable_rules(crop) {
        match measurements.get(&rule.contaminant) {
            Some(value) => {
                let result = classify_value(table, rule, value);
                tracing::trace!(
                    contaminant = %rule.contaminant,
                    status = %result.status,
                    "classified"
                );
                results.insert(rule.contaminant.clone(), result);
            }
            None => not_measured.push(rule.contaminant.clone()),
        }
    }

    let mut ignored = Vec::new();
    for key in measurements.keys() {
        if results.contains_key(key) {
            continue;
        }
        let reason = if table.contaminant(key).is_none() {
            IgnoreReason::Unknown
        } else if table.has_any_rule(key) {
            IgnoreReason::NotApplicable
        } else {
            IgnoreReason::NoLimit
        };
        tracing::debug!(key = %key, ?reason, "measurement ignored");
        ignored.push(IgnoredInput {
            key: key.clone(),
            reason,
        });
    }

    Evaluation {
        crop,
        results,
        ignored,
        not_measured,
    }
}

/// Classify a single value against a rule.
fn classify_value(table: &RuleTable, rule: &ThresholdRule, value: &AnalysisValue) -> ContaminantResult {
    let name = table
        .display_name(&rule.contaminant)
        .unwrap_or(&rule.contaminant)
        .to_string();
    let unit = table.unit(&rule.contaminant).unwrap_or_default().to_string();

    let (status, uncertain, reason) = match (value, rule.limit) {
        (AnalysisValue::BelowDetection(dl), limit) => classify_below_detection(*dl, limit, &name, &unit),
        (_, Limit::Zero) => {
            let v = value.numeric();
            if v.is_zero() {
                (Status::Ok, false, format!("{}: {} -> none detected, required = 0", name, value))
            } else {
                (
                    Status::Danger,
                    false,
                    format!("{}: {} {} detected, required = 0 -> Danger", name, v, unit),
                )
            }
        }
        (_, Limit::Banded { warning, danger }) => {
            let v = value.numeric();
            if v >= danger {
                (
                    Status::Danger,
                    false,
                    format!("{}: {} {} >= danger limit {} -> Danger", name, v, unit, danger),
                )
            } else if v >= warning {
                (
                    Status::Warning,
                    false,
                    format!(
                        "{}: {} {} >= warning limit {} but < danger limit {} -> Warning",
                        name, v, unit, warning, danger
                    ),
                )
            } else {
                (
                    Status::Ok,
                    false,
                    format!("{}: {} {} < warning limit {} -> OK", name, v, unit, warning),
                )
            }
        }
    };

    ContaminantResult {
        contaminant: rule.contaminant.clone(),
        display_name: name,
        unit,
        value: *value,
        status,
        limit: rule.limit,
        uncertain,
        reason,
    }
}

/// A below-detection value is never an exceedance on its own. It is flagged
/// uncertain when the detection limit reaches the first limit it could hide.
fn classify_below_detection(
    detection_limit: Decimal,
    limit: Limit,
    name: &str,
    unit: &str,
) -> (Status, bool, String) {
    let first = match limit {
        Limit::Zero => Decimal::ZERO,
        Limit::Banded { warning, .. } => warning,
    };
    if detection_limit > first || (detection_limit == first && !matches!(limit, Limit::Zero)) {
        (
            Status::Ok,
            true,
            format!(
                "{}: < {} {}, detection limit does not rule out {} -> OK (uncertain)",
                name, detection_limit, unit, limit
            ),
        )
    } else {
        (
            Status::Ok,
            false,
            format!("{}: < {} {} -> OK", name, detection_limit, unit),
        )
    }
}

/// Derive the overall verdict from the worst per-contaminant status.
pub fn verdict(evaluation: &Evaluation) -> Verdict {
    let Some(worst) = evaluation.worst() else {
        return Verdict {
            grade: None,
            passed: false,
            reason: "No contaminants evaluated".to_string(),
            determining: vec![],
        };
    };

    let determining: Vec<String> = evaluation
        .results
        .values()
        .filter(|r| r.status == worst)
        .map(|r| r.contaminant.clone())
        .collect();

    let grade = match worst {
        Status::Ok => Grade::One,
        Status::Warning => Grade::Two,
        Status::Danger => Grade::Three,
    };

    let reason = match worst {
        Status::Ok => format!("All {} contaminants within limits", evaluation.results.len()),
        _ if determining.len() == 1 => format!("Determined by {} ({})", determining[0], worst),
        _ => format!(
            "Determined by {} contaminants at {} level",
            determining.len(),
            worst
        ),
    };

    Verdict {
        grade: Some(grade),
        passed: worst != Status::Danger,
        reason,
        determining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::schema::{ContaminantDef, ContaminantGroupDef, RuleSetDef, ThresholdRuleDef};
    use rust_decimal_macros::dec;

    fn contaminant(key: &str, unit: &str) -> ContaminantDef {
        ContaminantDef {
            key: key.into(),
            display_name: key.into(),
            unit: unit.into(),
            note: None,
        }
    }

    fn banded(key: &str, warning: Decimal, danger: Decimal) -> ThresholdRuleDef {
        ThresholdRuleDef {
            contaminant: key.into(),
            warning: Some(warning),
            danger: Some(danger),
            must_be_zero: false,
            note: None,
        }
    }

    fn zero(key: &str) -> ThresholdRuleDef {
        ThresholdRuleDef {
            contaminant: key.into(),
            warning: None,
            danger: None,
            must_be_zero: true,
            note: None,
        }
    }

    fn make_table() -> RuleTable {
        RuleTable::new(RuleSetDef {
            name: "Test".into(),
            description: None,
            version: "1.0".into(),
            source: None,
            contaminants: vec![
                contaminant("arsen", "mg/kg"),
                contaminant("cadmi", "mg/kg"),
                contaminant("salmonella", "CFU/25g"),
                contaminant("nitrat", "mg/kg"),
                contaminant("nano3_kno3", "mg/kg"),
            ],
            groups: vec![ContaminantGroupDef {
                key: "heavy_metals".into(),
                title: "Kim loại nặng".into(),
                color: None,
                crop_dependent: true,
                contaminants: vec!["arsen".into(), "cadmi".into()],
            }],
            common: vec![zero("salmonella"), banded("nitrat", dec!(2000), dec!(5000))],
            crops: BTreeMap::from([
                (CropType::Dried, vec![banded("arsen", dec!(0.7), dec!(1))]),
                (CropType::Allium, vec![banded("cadmi", dec!(0.03), dec!(0.05))]),
                (CropType::Leafy, vec![banded("cadmi", dec!(0.15), dec!(0.2))]),
            ]),
            sampling_plans: vec![],
        })
        .unwrap()
    }

    fn measured(pairs: &[(&str, Decimal)]) -> Measurements {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), AnalysisValue::Measured(*v)))
            .collect()
    }

    #[test]
    fn test_banded_tiers() {
        let table = make_table();
        for (value, expected) in [
            (dec!(0.5), Status::Ok),
            (dec!(0.7), Status::Warning),
            (dec!(0.8), Status::Warning),
            (dec!(1.0), Status::Danger),
            (dec!(3), Status::Danger),
        ] {
            let eval = evaluate(&table, Some(CropType::Dried), &measured(&[("arsen", value)]));
            assert_eq!(eval.results["arsen"].status, expected, "arsen = {value}");
        }
    }

    #[test]
    fn test_must_be_zero() {
        let table = make_table();
        let eval = evaluate(&table, None, &measured(&[("salmonella", dec!(0))]));
        assert_eq!(eval.results["salmonella"].status, Status::Ok);

        let eval = evaluate(&table, None, &measured(&[("salmonella", dec!(1))]));
        assert_eq!(eval.results["salmonella"].status, Status::Danger);

        let eval = evaluate(&table, None, &measured(&[("salmonella", dec!(0.001))]));
        assert_eq!(eval.results["salmonella"].status, Status::Danger);
        assert_eq!(eval.results["salmonella"].limit, Limit::Zero);
    }

    #[test]
    fn test_not_detected_counts_as_zero() {
        let table = make_table();
        let m = Measurements::from([("salmonella".to_string(), AnalysisValue::NotDetected)]);
        let eval = evaluate(&table, None, &m);
        assert_eq!(eval.results["salmonella"].status, Status::Ok);
    }

    #[test]
    fn test_crop_scoping() {
        let table = make_table();
        let m = measured(&[("cadmi", dec!(0.1))]);
        let allium = evaluate(&table, Some(CropType::Allium), &m);
        let leafy = evaluate(&table, Some(CropType::Leafy), &m);
        assert_eq!(allium.results["cadmi"].status, Status::Danger);
        assert_eq!(leafy.results["cadmi"].status, Status::Ok);
    }

    #[test]
    fn test_heavy_metal_not_applicable_to_other_crop() {
        let table = make_table();
        let eval = evaluate(&table, Some(CropType::Leafy), &measured(&[("arsen", dec!(5))]));
        assert!(eval.results.is_empty());
        assert_eq!(eval.ignored[0].reason, IgnoreReason::NotApplicable);
    }

    #[test]
    fn test_unknown_crop_applies_common_only() {
        let table = make_table();
        let m = measured(&[("cadmi", dec!(9)), ("nitrat", dec!(100))]);
        let eval = evaluate_label(&table, "Rau muống biển", &m);
        assert_eq!(eval.crop, None);
        assert!(!eval.results.contains_key("cadmi"));
        assert_eq!(eval.results["nitrat"].status, Status::Ok);
    }

    #[test]
    fn test_empty_measurements() {
        let table = make_table();
        let eval = evaluate(&table, Some(CropType::Dried), &Measurements::new());
        assert!(eval.results.is_empty());
        assert_eq!(eval.not_measured, vec!["salmonella", "nitrat", "arsen"]);
    }

    #[test]
    fn test_unknown_and_unlimited_keys_ignored() {
        let table = make_table();
        let m = measured(&[("unobtainium", dec!(5)), ("nano3_kno3", dec!(50))]);
        let eval = evaluate(&table, None, &m);
        assert!(eval.results.is_empty());
        let reasons: BTreeMap<_, _> = eval
            .ignored
            .iter()
            .map(|i| (i.key.as_str(), i.reason.clone()))
            .collect();
        assert_eq!(reasons["unobtainium"], IgnoreReason::Unknown);
        assert_eq!(reasons["nano3_kno3"], IgnoreReason::NoLimit);
    }

    #[test]
    fn test_below_detection_never_danger() {
        let table = make_table();
        let m = Measurements::from([
            ("nitrat".to_string(), AnalysisValue::BelowDetection(dec!(6000))),
            ("salmonella".to_string(), AnalysisValue::BelowDetection(dec!(1))),
        ]);
        let eval = evaluate(&table, None, &m);
        assert_eq!(eval.results["nitrat"].status, Status::Ok);
        assert!(eval.results["nitrat"].uncertain);
        assert_eq!(eval.results["salmonella"].status, Status::Ok);
        assert!(eval.results["salmonella"].uncertain);
    }

    #[test]
    fn test_below_detection_under_warning_is_certain() {
        let table = make_table();
        let m = Measurements::from([(
            "nitrat".to_string(),
            AnalysisValue::BelowDetection(dec!(10)),
        )]);
        let eval = evaluate(&table, None, &m);
        assert!(!eval.results["nitrat"].uncertain);
    }

    #[test]
    fn test_idempotent() {
        let table = make_table();
        let m = measured(&[("arsen", dec!(0.8)), ("salmonella", dec!(1))]);
        let a = evaluate(&table, Some(CropType::Dried), &m);
        let b = evaluate(&table, Some(CropType::Dried), &m);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reason_strings_populated() {
        let table = make_table();
        let eval = evaluate(&table, Some(CropType::Dried), &measured(&[("arsen", dec!(0.8))]));
        let r = &eval.results["arsen"];
        assert!(r.reason.contains("0.8"));
        assert!(r.reason.contains("Warning"));
    }

    #[test]
    fn test_verdict_grades() {
        let table = make_table();
        let ok = evaluate(&table, None, &measured(&[("nitrat", dec!(100))]));
        let v = verdict(&ok);
        assert_eq!(v.grade, Some(Grade::One));
        assert!(v.passed);

        let warn = evaluate(&table, None, &measured(&[("nitrat", dec!(3000))]));
        let v = verdict(&warn);
        assert_eq!(v.grade, Some(Grade::Two));
        assert!(v.passed);
        assert_eq!(v.determining, vec!["nitrat"]);

        let fail = evaluate(
            &table,
            None,
            &measured(&[("nitrat", dec!(3000)), ("salmonella", dec!(2))]),
        );
        let v = verdict(&fail);
        assert_eq!(v.grade, Some(Grade::Three));
        assert!(!v.passed);
        assert_eq!(v.determining, vec!["salmonella"]);
    }

    #[test]
    fn test_verdict_empty() {
        let table = make_table();
        let v = verdict(&evaluate(&table, None, &Measurements::new()));
        assert_eq!(v.grade, None);
        assert!(!v.passed);
    }

    #[test]
    fn test_wire_form() {
        let table = make_table();
        let eval = evaluate(
            &table,
            Some(CropType::Dried),
            &measured(&[("arsen", dec!(0.8)), ("salmonella", dec!(0))]),
        );
        let json = serde_json::to_value(eval.to_wire()).unwrap();
        assert_eq!(json["arsen"]["status"], "Warning");
        assert_eq!(json["arsen"]["limit"], 1.0);
        assert_eq!(json["salmonella"]["status"], "OK");
        assert_eq!(json["salmonella"]["limit"], "zero");
    }
}
