//! Night Audit API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::models::{NightAuditDetail, NightAuditPreview, NightAuditRun};

use crate::core::AppState;
use crate::night_audit::NightAuditPoster;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Query params for the preview
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub date: String,
}

/// Query params for listing runs
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Request to run the night audit
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// YYYY-MM-DD
    pub audit_date: String,
    pub notes: Option<String>,
    pub run_by: Option<String>,
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date {:?}, expected YYYY-MM-DD", raw)))
}

/// GET /api/night-audit/preview?date= - 夜审预览 (只读)
pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> AppResult<Json<AppResponse<NightAuditPreview>>> {
    let date = parse_date(&query.date)?;
    let poster = NightAuditPoster::new(state.providers.clone());
    let preview = poster.preview(date).await?;
    Ok(ok(preview))
}

/// POST /api/night-audit/run - 执行夜审
pub async fn run(
    State(state): State<AppState>,
    Json(payload): Json<RunRequest>,
) -> AppResult<Json<AppResponse<NightAuditRun>>> {
    let date = parse_date(&payload.audit_date)?;
    let poster = NightAuditPoster::new(state.providers.clone());
    let run = poster.run(date, payload.notes, payload.run_by).await?;
    Ok(ok(run))
}

/// GET /api/night-audit - 夜审历史
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<NightAuditRun>>>> {
    let poster = NightAuditPoster::new(state.providers.clone());
    let runs = poster.list(query.limit.clamp(1, 100), query.offset.max(0)).await?;
    Ok(ok(runs))
}

/// GET /api/night-audit/:id - 夜审详情 (含已过账预订，供报表导出)
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<NightAuditDetail>>> {
    let poster = NightAuditPoster::new(state.providers.clone());
    let detail = poster.detail(id).await?;
    Ok(ok(detail))
}
