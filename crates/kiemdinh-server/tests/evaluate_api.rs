//! Integration tests for the /api/v1/evaluate endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: compact wire shape, banded and zero-tolerance limits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn evaluate_returns_status_and_limit_per_contaminant() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate",
        json!({
            "cropType": "Rau ăn lá",
            "measurements": { "cadmi": 0.18, "salmonella": 1, "nitrat": "120" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["cadmi"]["status"], "Warning");
    assert_eq!(json["cadmi"]["limit"].as_f64(), Some(0.2));
    assert_eq!(json["salmonella"]["status"], "Danger");
    assert_eq!(json["salmonella"]["limit"], "zero");
    assert_eq!(json["nitrat"]["status"], "OK");
    assert_eq!(json["nitrat"]["limit"].as_f64(), Some(5000.0));
}

#[tokio::test]
async fn evaluate_omits_missing_and_inapplicable_contaminants() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate",
        json!({
            "cropType": "Rau khô",
            "measurements": { "cadmi": 0.5, "arsen": null, "unobtainium": 3 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, json!({}));
}

#[tokio::test]
async fn evaluate_without_crop_type_applies_common_rules() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate",
        json!({ "measurements": { "plumbum": 9, "ecoli": 150 } }),
    )
    .await;

    let json = body_json(response).await;
    assert!(json.get("plumbum").is_none());
    assert_eq!(json["ecoli"]["status"], "Warning");
}

// ---------------------------------------------------------------------------
// Test: detailed response carries ignored inputs and verdict
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detailed_includes_verdict_and_ignored_inputs() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/detailed",
        json!({
            "cropType": "Hành",
            "measurements": { "cadmi": 0.04, "salmonella": "KPH", "unobtainium": 3 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["crop_type"], "Hành");
    assert_eq!(json["evaluation"]["crop"], "allium");
    assert_eq!(json["evaluation"]["results"]["cadmi"]["status"], "Warning");
    assert_eq!(json["evaluation"]["ignored"][0]["key"], "unobtainium");
    assert_eq!(json["evaluation"]["ignored"][0]["reason"]["kind"], "unknown");
    assert_eq!(json["verdict"]["grade"], "Grade 2");
    assert_eq!(json["verdict"]["passed"], true);
}

#[tokio::test]
async fn detailed_with_nothing_evaluated_does_not_pass() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/detailed",
        json!({ "cropType": "Nấm", "measurements": {} }),
    )
    .await;

    let json = body_json(response).await;
    assert!(json["verdict"]["grade"].is_null());
    assert_eq!(json["verdict"]["passed"], false);
}

// ---------------------------------------------------------------------------
// Test: sampling plan endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn samples_with_two_marginal_is_grade_two() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/samples",
        json!({ "contaminant": "E. coli", "values": [150, 200, 10, 10, 10] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["contaminant"], "ecoli");
    assert_eq!(json["status"], "Warning");
    assert_eq!(json["grade"], "Grade 2");
    assert_eq!(json["marginal"], 2);
}

#[tokio::test]
async fn samples_wrong_count_is_validation_error() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/samples",
        json!({ "contaminant": "ecoli", "values": [1, 2] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn samples_without_plan_is_not_found() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/samples",
        json!({ "contaminant": "salmonella", "values": [0, 0, 0, 0, 0] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: numbers that cannot be represented reject the request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn out_of_range_measurements_are_validation_errors() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate",
        json!({
            "cropType": "Rau ăn lá",
            "measurements": { "nitrat": 1e30, "salmonella": -1, "cadmi": 0.01 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn detailed_rejects_negative_text_measurement() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate/detailed",
        json!({ "cropType": "Hành", "measurements": { "cadmi": "-0,2" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("cadmi"));
}

// ---------------------------------------------------------------------------
// Test: malformed bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let response = post_raw(common::build_test_app(), "/api/v1/evaluate", "{ not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn wrong_value_type_is_bad_request() {
    let response = post_json(
        common::build_test_app(),
        "/api/v1/evaluate",
        json!({ "cropType": "Hành", "measurements": { "cadmi": [0.1] } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
