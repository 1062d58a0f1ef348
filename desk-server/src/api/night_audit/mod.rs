//! Night Audit API 模块 (夜审)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/night-audit/", get(handler::list))
        .route("/api/night-audit/preview", get(handler::preview))
        .route("/api/night-audit/run", post(handler::run))
        .route("/api/night-audit/{id}", get(handler::detail))
}
