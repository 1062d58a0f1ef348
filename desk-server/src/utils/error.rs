//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 业务错误 | E0002 验证失败、E0004 冲突 |
//! | E9xxx | 系统错误 | E9001 内部错误、E9002 上游接口错误 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::NotFound("Stay 42 not found".into()))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::billing::BillingError;
use crate::night_audit::AuditError;
use crate::providers::ProviderError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 非致命警告 (例如退房后挂账失败)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 应用错误枚举
///
/// | 分类 | 说明 |
/// |------|------|
/// | 业务逻辑错误 | 资源不存在、验证失败、规则冲突 |
/// | 系统错误 | 上游接口错误、内部错误 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突 (409) —— 重复夜审、重复退押金
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Business rule violation: {0}")]
    /// 业务规则违反 (422)
    BusinessRule(String),

    #[error("Upstream API error: {0}")]
    /// 上游酒店 API 错误 (502)
    Upstream(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.as_str()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),

            // Business rule (422)
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.as_str())
            }

            // Upstream errors (502)
            AppError::Upstream(msg) => {
                error!(target: "upstream", error = %msg, "Upstream API error");
                (StatusCode::BAD_GATEWAY, "E9002", "Upstream hotel API error")
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
            warning: None,
        });

        (status, body).into_response()
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound { .. } => AppError::NotFound(e.to_string()),
            ProviderError::Conflict { .. } => AppError::Conflict(e.to_string()),
            ProviderError::Validation { .. } => AppError::Validation(e.to_string()),
            ProviderError::Upstream { .. } => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<BillingError> for AppError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::InvalidStayDates { .. }
            | BillingError::MissingRate { .. }
            | BillingError::InvalidAmount
            | BillingError::InvalidOperation(_) => AppError::Validation(e.to_string()),
            BillingError::AlreadyCheckedOut(_)
            | BillingError::DepositAlreadyRefunded { .. } => AppError::Conflict(e.to_string()),
            BillingError::DepositOutstanding { .. } | BillingError::IllegalTransition { .. } => {
                AppError::BusinessRule(e.to_string())
            }
            BillingError::Provider(p) => p.into(),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::AlreadyRun { .. } => AppError::Conflict(e.to_string()),
            AuditError::InvalidDate(_) => AppError::Validation(e.to_string()),
            AuditError::RunAborted { .. } => AppError::Upstream(e.to_string()),
            AuditError::Provider(p) => p.into(),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        warning: None,
    })
}

/// Create a successful response carrying a non-fatal warning
pub fn ok_with_warning<T: Serialize>(data: T, warning: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        warning: Some(warning.into()),
    })
}
