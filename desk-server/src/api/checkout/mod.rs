//! Checkout API 模块 (退房结算)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/{stay_id}/preview", get(handler::preview))
        .route("/{stay_id}/deposit-refund", post(handler::deposit_refund))
        .route("/{stay_id}/complete", post(handler::complete))
}
