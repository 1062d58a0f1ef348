//! 健康检查接口

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - 存活探测
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
