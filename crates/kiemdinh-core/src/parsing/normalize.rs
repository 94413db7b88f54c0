use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Normalize a contaminant name from an inspection form to a canonical key.
///
/// Steps:
/// 1. Compose to NFC, so decomposed diacritics match the alias map
/// 2. Strip a trailing element symbol in parentheses: "Cadmi (Cd)" -> "Cadmi"
/// 3. Lowercase
/// 4. Replace spaces, punctuation and separators with underscores
/// 5. Collapse multiple underscores
/// 6. Look up in alias map
pub fn normalize_contaminant(raw: &str) -> String {
    let mut s = raw.trim().nfc().collect::<String>();

    if let Some(idx) = s.rfind('(') {
        let after = &s[idx..];
        if idx > 0 && after.len() <= 6 && after.ends_with(')') {
            s = s[..idx].trim_end().to_string();
        }
    }

    s = s.to_lowercase();

    let mut result = String::with_capacity(s.len());
    let mut prev_underscore = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            result.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            result.push('_');
            prev_underscore = true;
        }
    }
    if result.ends_with('_') {
        result.pop();
    }

    match ALIASES.get(result.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => result,
    }
}

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Heavy metals
    m.insert("as", "arsen");
    m.insert("asen", "arsen");
    m.insert("arsenic", "arsen");
    m.insert("pb", "plumbum");
    m.insert("chì", "plumbum");
    m.insert("chi", "plumbum");
    m.insert("lead", "plumbum");
    m.insert("cd", "cadmi");
    m.insert("cadmium", "cadmi");
    m.insert("hg", "hydrargyrum");
    m.insert("hydragyrum", "hydrargyrum");
    m.insert("thủy_ngân", "hydrargyrum");
    m.insert("thuỷ_ngân", "hydrargyrum");
    m.insert("thuy_ngan", "hydrargyrum");
    m.insert("mercury", "hydrargyrum");

    // Pathogens
    m.insert("e_coli", "ecoli");
    m.insert("escherichia_coli", "ecoli");
    m.insert("coliform", "coliforms");
    m.insert("tổng_coliforms", "coliforms");

    // Fumigants and preservatives
    m.insert("so2", "sulfur_dioxide");
    m.insert("sulphur_dioxide", "sulfur_dioxide");
    m.insert("methylbromide", "methyl_bromide");
    m.insert("ch3br", "methyl_bromide");
    m.insert("hydrogenphosphide", "hydrogen_phosphide");
    m.insert("phosphine", "hydrogen_phosphide");
    m.insert("ph3", "hydrogen_phosphide");

    // Pesticide residues
    m.insert("glyphosate_glufosinate", "glyphosate_glufosinate");
    m.insert("glyphosate_and_glufosinate", "glyphosate_glufosinate");
    m.insert("dithiocarbamates", "dithiocarbamate");

    // Agrochemicals
    m.insert("nitrate", "nitrat");
    m.insert("no3", "nitrat");
    m.insert("nano3_kno3", "nano3_kno3");
    m.insert("nano3", "nano3_kno3");
    m.insert("kno3", "nano3_kno3");

    m
});
