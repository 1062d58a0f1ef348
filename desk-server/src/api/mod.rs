//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`checkout`] - 退房结算接口
//! - [`night_audit`] - 夜审接口
//!
//! 处理器只做参数解析和响应组装，所有决策都在 `billing` / `night_audit`
//! 组件里完成。

pub mod checkout;
pub mod health;
pub mod night_audit;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::AppState;

/// 组装全部路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(checkout::router())
        .merge(night_audit::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
