#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use kiemdinh_core::rules::builtin::load_preset;
use kiemdinh_core::rules::RuleTable;
use kiemdinh_server::config::ServerConfig;
use kiemdinh_server::router::build_app_router;
use kiemdinh_server::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        rules_file: None,
        rules_preset: "rau".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router against the built-in "rau" table.
pub fn build_test_app() -> Router {
    let table = RuleTable::new(load_preset("rau").unwrap()).unwrap();
    build_app_router(AppState::new(table, test_config()))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
