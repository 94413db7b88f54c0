use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kiemdinh_core::classify::outcome::{Evaluation, SampleEvaluation, Verdict, WireResult};
use kiemdinh_core::error::KiemdinhError;
use kiemdinh_core::model::EvaluationRequest;
use kiemdinh_core::parsing::normalize::normalize_contaminant;

use crate::error::AppResult;
use crate::state::AppState;

/// Response of `POST /evaluate/detailed`.
#[derive(Debug, Serialize)]
pub struct DetailedResponse {
    /// Crop label as submitted.
    pub crop_type: Option<String>,
    pub evaluation: Evaluation,
    pub verdict: Verdict,
}

/// Body of `POST /evaluate/samples`.
#[derive(Debug, Deserialize)]
pub struct SamplesRequest {
    pub contaminant: String,
    pub values: Vec<f64>,
}

/// POST /evaluate -- `{ key: { status, limit } }` for every evaluated contaminant.
pub async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> AppResult<Json<BTreeMap<String, WireResult>>> {
    let Json(request) = payload?;
    let evaluation = kiemdinh_core::evaluate_request(&state.table, &request)?;
    Ok(Json(evaluation.to_wire()))
}

/// POST /evaluate/detailed -- full evaluation with ignored inputs and verdict.
pub async fn evaluate_detailed(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> AppResult<Json<DetailedResponse>> {
    let Json(request) = payload?;
    let evaluation = kiemdinh_core::evaluate_request(&state.table, &request)?;
    let verdict = kiemdinh_core::classify::verdict(&evaluation);
    Ok(Json(DetailedResponse {
        crop_type: request.crop_type,
        evaluation,
        verdict,
    }))
}

/// POST /evaluate/samples -- replicate counts against a sampling plan.
pub async fn evaluate_samples(
    State(state): State<AppState>,
    payload: Result<Json<SamplesRequest>, JsonRejection>,
) -> AppResult<Json<SampleEvaluation>> {
    let Json(request) = payload?;

    let values = request
        .values
        .iter()
        .map(|v| {
            Decimal::from_f64(*v).ok_or_else(|| {
                KiemdinhError::InvalidInput(format!("sample value {v} is not a finite number"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let key = normalize_contaminant(&request.contaminant);
    let result = kiemdinh_core::classify::evaluate_samples(&state.table, &key, &values)?;
    Ok(Json(result))
}
