use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use kiemdinh_core::model::{CropType, Limit};
use kiemdinh_core::rules::schema::ContaminantGroupDef;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContaminantSummary {
    pub key: String,
    pub display_name: String,
    pub unit: String,
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CropSummary {
    pub id: &'static str,
    pub label: &'static str,
}

/// Response of `GET /rules`.
#[derive(Debug, Serialize)]
pub struct RulesSummary {
    pub name: String,
    pub version: String,
    pub source: Option<String>,
    pub contaminants: Vec<ContaminantSummary>,
    pub groups: Vec<ContaminantGroupDef>,
    pub crop_types: Vec<CropSummary>,
}

#[derive(Debug, Serialize)]
pub struct LimitEntry {
    pub contaminant: String,
    pub display_name: String,
    pub unit: String,
    pub limit: Limit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response of `GET /rules/crops/{crop}`.
#[derive(Debug, Serialize)]
pub struct CropRules {
    /// `None` when the crop was not recognised; only common limits apply.
    pub crop: Option<CropType>,
    pub label: Option<&'static str>,
    pub limits: Vec<LimitEntry>,
}

/// GET /rules -- loaded rule table summary.
pub async fn summary(State(state): State<AppState>) -> Json<RulesSummary> {
    let table = &state.table;
    let contaminants = table
        .definition()
        .contaminants
        .iter()
        .map(|c| ContaminantSummary {
            key: c.key.clone(),
            display_name: c.display_name.clone(),
            unit: c.unit.clone(),
            group: table.group_of(&c.key).map(|g| g.key.clone()),
            note: c.note.clone(),
        })
        .collect();

    Json(RulesSummary {
        name: table.name().to_string(),
        version: table.version().to_string(),
        source: table.source().map(str::to_string),
        contaminants,
        groups: table.groups().to_vec(),
        crop_types: CropType::ALL
            .into_iter()
            .map(|c| CropSummary {
                id: c.id(),
                label: c.label(),
            })
            .collect(),
    })
}

/// GET /rules/crops/{crop} -- limits applicable to a crop id or label.
pub async fn crop_rules(State(state): State<AppState>, Path(crop): Path<String>) -> Json<CropRules> {
    let table = &state.table;
    let resolved = CropType::from_str_loose(&crop);

    let limits = table
        .applicable_rules(resolved)
        .map(|rule| LimitEntry {
            contaminant: rule.contaminant.clone(),
            display_name: table
                .display_name(&rule.contaminant)
                .unwrap_or(rule.contaminant.as_str())
                .to_string(),
            unit: table.unit(&rule.contaminant).unwrap_or_default().to_string(),
            limit: rule.limit,
            note: table.note(rule).map(str::to_string),
        })
        .collect();

    Json(CropRules {
        crop: resolved,
        label: resolved.map(|c| c.label()),
        limits,
    })
}
