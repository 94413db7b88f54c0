use kiemdinh_core::error::KiemdinhError;
use kiemdinh_core::model::{CropType, Limit};
use kiemdinh_core::rules::{builtin, RuleTable, ThresholdRule};
use std::path::Path;

pub fn list() -> Result<(), KiemdinhError> {
    println!("Available predefined rule tables:\n");
    for name in builtin::PRESETS {
        let rs = builtin::load_preset(name)?;
        println!("  {:<8} {} (v{})", name, rs.name, rs.version);
        if let Some(ref desc) = rs.description {
            println!("           {}", desc);
        }
        if let Some(ref source) = rs.source {
            println!("           Source: {}", source);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str, crop: Option<&str>) -> Result<(), KiemdinhError> {
    let table = RuleTable::new(builtin::load_preset(preset)?)?;

    println!("{} (version {})\n", table.name(), table.version());
    if let Some(ref desc) = table.definition().description {
        println!("{}\n", desc);
    }
    if let Some(source) = table.source() {
        println!("Source: {}\n", source);
    }

    println!("Each measured contaminant is classified as OK, Warning or Danger.");
    println!("Banded limits: below warning is OK, from warning up to danger is");
    println!("Warning, at or above danger is Danger. Zero-tolerance contaminants");
    println!("are Danger at any non-zero value.\n");

    println!("Groups:\n");
    for group in table.groups() {
        let scope = if group.crop_dependent {
            "limits depend on crop type"
        } else {
            "limits apply to every crop type"
        };
        println!("  {:<20} {} ({})", group.key, group.title, scope);
    }
    println!();

    match crop {
        Some(label) => {
            let resolved = CropType::from_str_loose(label).ok_or_else(|| {
                KiemdinhError::InvalidInput(format!(
                    "unknown crop type '{label}', run `kiemdinh rules crops` for the list"
                ))
            })?;
            println!("Limits for {} ({}):\n", resolved, resolved.id());
            print_thresholds(&table, table.applicable_rules(Some(resolved)).collect());
        }
        None => {
            println!("Common limits (all crop types):\n");
            print_thresholds(&table, table.applicable_rules(None).collect());
            for crop in CropType::ALL {
                let rules: Vec<&ThresholdRule> = table
                    .crop_contaminants(Some(crop))
                    .into_iter()
                    .filter_map(|key| table.rule(key, Some(crop)))
                    .collect();
                if rules.is_empty() {
                    continue;
                }
                println!("{} ({}):\n", crop, crop.id());
                print_thresholds(&table, rules);
            }
        }
    }

    let notes: Vec<_> = table
        .definition()
        .contaminants
        .iter()
        .filter_map(|c| c.note.as_deref().map(|note| (c.display_name.as_str(), note)))
        .collect();
    if !notes.is_empty() {
        println!("Notes:\n");
        for (name, note) in notes {
            println!("  {}: {}", name, note);
        }
        println!();
    }

    for plan in &table.definition().sampling_plans {
        println!(
            "Sampling plan for {}: n = {}, c = {}, m = {}, M = {} {}",
            plan.contaminant,
            plan.samples,
            plan.max_marginal,
            plan.marginal,
            plan.reject,
            table.unit(&plan.contaminant).unwrap_or_default()
        );
    }

    Ok(())
}

fn print_thresholds(table: &RuleTable, rules: Vec<&ThresholdRule>) {
    let max_name_len = rules
        .iter()
        .map(|r| r.contaminant.len())
        .max()
        .unwrap_or(20);

    println!(
        "  {:<width$}  {:<10}  {:<10}  Unit",
        "Contaminant",
        "Warning",
        "Danger",
        width = max_name_len + 2
    );
    println!("  {}", "-".repeat(max_name_len + 2 + 24 + 10));

    for rule in rules {
        let (warning, danger) = match rule.limit {
            Limit::Zero => ("-".to_string(), "> 0".to_string()),
            Limit::Banded { warning, danger } => (warning.to_string(), danger.to_string()),
        };
        println!(
            "  {:<width$}  {:<10}  {:<10}  {}",
            rule.contaminant,
            warning,
            danger,
            table.unit(&rule.contaminant).unwrap_or_default(),
            width = max_name_len + 2
        );
    }
    println!();
}

pub fn schema() -> Result<(), KiemdinhError> {
    print!(
        r##"JSON Rule Schema
================

A rule file defines contaminant limits for inspected vegetables. When you
run `kiemdinh evaluate`, each measured contaminant that applies to the
sample's crop type is compared against its limit.

Top-level fields:
  name          (string, required)  Human-readable name of the rule table
  description   (string, optional)  What this rule table is for
  version       (string, required)  Version identifier (e.g., "2025.1")
  source        (string, optional)  Regulation(s) the limits come from
  contaminants  (array, required)   Known contaminants (see below)
  groups        (array, optional)   Display groups (see below)
  common        (array, required)   Rules applying to every crop type
  crops         (object, optional)  Map of crop type id -> array of rules.
                                    Run `kiemdinh rules crops` for the ids.
  sampling_plans
                (array, optional)   Replicate-count plans (see below)

Each contaminant:
  key           (string, required)  Canonical key (lowercase, underscores)
  display_name  (string, required)  Name shown in reports
  unit          (string, required)  Unit of measurement (e.g., "mg/kg")
  note          (string, optional)

Each group:
  key, title    (string, required)
  color         (string, optional)  Display color (e.g., "#f50")
  crop_dependent
                (bool, optional)    Members may only be limited per crop,
                                    never in "common". Default: false
  contaminants  (array, required)   Member contaminant keys

Each rule (in "common" or under a crop type):
  contaminant   (string, required)  Contaminant key
  warning       (string)            Warning limit (inclusive)
  danger        (string)            Danger limit (inclusive)
  must_be_zero  (bool, optional)    Zero tolerance: any non-zero value is
                                    Danger. Replaces warning/danger.
  note          (string, optional)  Regulatory reference or explanation

  Without must_be_zero both limits are required and 0 <= warning <= danger.

Each sampling plan:
  contaminant   (string, required)
  samples       (number, required)  Replicates per lot (n)
  max_marginal  (number, required)  Marginal samples allowed (c)
  marginal      (string, required)  Lower bound of the marginal band (m)
  reject        (string, required)  Rejection limit (M)

Example:
{{
  "name": "My custom rule table",
  "version": "1.0",
  "contaminants": [
    {{ "key": "cadmi", "display_name": "Cadmi", "unit": "mg/kg" }},
    {{ "key": "salmonella", "display_name": "Salmonella", "unit": "CFU/25g" }}
  ],
  "groups": [
    {{ "key": "heavy_metals", "title": "Kim loại nặng", "crop_dependent": true, "contaminants": ["cadmi"] }},
    {{ "key": "pathogens", "title": "Vi sinh vật", "contaminants": ["salmonella"] }}
  ],
  "common": [
    {{ "contaminant": "salmonella", "must_be_zero": true }}
  ],
  "crops": {{
    "leafy": [
      {{ "contaminant": "cadmi", "warning": "0.15", "danger": "0.2" }}
    ]
  }}
}}

Note: limit values must be quoted strings, not bare numbers,
to preserve exact decimal precision (e.g., "0.05" not 0.05).
"##
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), KiemdinhError> {
    let table = RuleTable::new(kiemdinh_core::rules::load_ruleset(file)?)?;
    let def = table.definition();

    println!("Rule table '{}' (v{}) is valid.", table.name(), table.version());
    println!("  Contaminants: {}", def.contaminants.len());
    println!("  Common rules: {}", def.common.len());
    println!("  Crop types with overrides: {}", def.crops.len());

    // Potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for contaminant in &def.contaminants {
        if !table.has_any_rule(&contaminant.key) {
            warnings.push(format!(
                "contaminant '{}' has no limit and will never be evaluated",
                contaminant.key
            ));
        }
        if !def.groups.is_empty() && table.group_of(&contaminant.key).is_none() {
            warnings.push(format!("contaminant '{}' is not in any group", contaminant.key));
        }
    }
    if table.groups().iter().any(|g| g.crop_dependent) {
        for crop in CropType::ALL {
            if !def.crops.contains_key(&crop) {
                warnings.push(format!("crop type '{}' has no overrides", crop.id()));
            }
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

pub fn crops() -> Result<(), KiemdinhError> {
    println!("Recognised crop types:\n");
    for crop in CropType::ALL {
        println!("  {:<14} {}", crop.id(), crop.label());
    }
    println!();
    println!("Either the id or the label may be given. Unrecognised labels are");
    println!("evaluated against the common limits only.");
    Ok(())
}
