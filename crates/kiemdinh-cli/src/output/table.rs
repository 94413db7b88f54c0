use kiemdinh_core::classify::outcome::{ContaminantResult, Grade, SampleEvaluation};
use kiemdinh_core::model::Status;
use kiemdinh_core::rules::RuleTable;

use crate::commands::evaluate::EvaluatedRequest;

pub fn print_evaluations(table: &RuleTable, results: &[EvaluatedRequest], show_all: bool, verbose: bool) {
    println!("=== {} (v{}) ===\n", table.name(), table.version());

    let multi_request = results.len() > 1;

    for (i, evaluated) in results.iter().enumerate() {
        if multi_request {
            if i > 0 {
                println!();
            }
            println!(
                "--- Request {}: {} ---\n",
                i + 1,
                evaluated.crop_type.as_deref().unwrap_or("(no crop type)")
            );
        }

        let evaluation = &evaluated.evaluation;
        let verdict = &evaluated.verdict;

        match evaluation.crop {
            Some(crop) => println!("  Crop type: {} ({})", crop, crop.id()),
            None => println!("  Crop type: not recognised, common limits only"),
        }

        let grade = verdict
            .grade
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string());
        let outcome = if verdict.passed { "PASSED" } else { "FAILED" };
        println!("  Verdict: {} {} ({})\n", grade, outcome, verdict.reason);

        // Per-contaminant results
        if verbose || show_all {
            let results_to_show: Vec<&ContaminantResult> = evaluation
                .results
                .values()
                .filter(|r| show_all || r.status != Status::Ok || r.uncertain)
                .collect();

            if !results_to_show.is_empty() {
                let max_name = results_to_show
                    .iter()
                    .map(|r| r.display_name.chars().count())
                    .max()
                    .unwrap_or(10);

                for r in &results_to_show {
                    let uncertain_marker = if r.uncertain { " (?)" } else { "" };
                    println!(
                        "  {:<width$}  {} {}  -> {}{}",
                        r.display_name,
                        r.value,
                        r.unit,
                        r.status,
                        uncertain_marker,
                        width = max_name
                    );
                    if verbose {
                        println!("    {}", r.reason);
                    }
                }
                println!();
            }
        }

        // Determining contaminants summary (non-verbose mode)
        if !verbose && !show_all && verdict.grade.is_some_and(|g| g != Grade::One) {
            println!("  Determining contaminants:");
            for key in &verdict.determining {
                if let Some(r) = evaluation.results.get(key) {
                    let uncertain_marker = if r.uncertain { " (?)" } else { "" };
                    println!(
                        "    {} -> {}{}  ({} {}, limit {})",
                        r.display_name, r.status, uncertain_marker, r.value, r.unit, r.limit
                    );
                }
            }
            println!();
        }

        if verbose {
            if !evaluation.not_measured.is_empty() {
                println!("  Not measured: {}", evaluation.not_measured.join(", "));
            }
            if !evaluation.ignored.is_empty() {
                println!("  Ignored inputs:");
                for ignored in &evaluation.ignored {
                    println!("    {:<20} {:?}", ignored.key, ignored.reason);
                }
            }
            println!();
        }
    }
}

pub fn print_samples(result: &SampleEvaluation) {
    println!("=== Sampling plan: {} ===\n", result.contaminant);
    println!(
        "  Plan: m = {} {unit}, M = {} {unit}, at most {} marginal samples",
        result.marginal_limit,
        result.reject_limit,
        result.max_marginal,
        unit = result.unit
    );
    println!("  Marginal samples: {}", result.marginal);
    println!("  Rejected samples: {}\n", result.rejected);
    println!("  Result: {} -> {} ({})\n", result.status, result.grade, result.reason);
}
