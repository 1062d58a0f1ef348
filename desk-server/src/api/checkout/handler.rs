//! Checkout API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use shared::models::{ChargeBreakdown, CheckoutRecord, Payment, PaymentMethod};

use crate::billing::{CheckoutFlow, CheckoutState};
use crate::core::AppState;
use crate::utils::error::ok_with_warning;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Preview of a stay's final bill
#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    pub stay_id: i64,
    pub state: CheckoutState,
    pub breakdown: ChargeBreakdown,
    pub balance_due: f64,
    pub total_paid: f64,
    pub is_late_checkout: bool,
    pub deposit_required: f64,
    pub deposit_settled: bool,
}

#[derive(Debug, Deserialize)]
pub struct DepositRefundRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    /// Late-checkout penalty; only accepted when the stay is actually late
    pub penalty: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResult {
    pub stay_id: i64,
    pub state: CheckoutState,
    pub breakdown: ChargeBreakdown,
    pub balance_due: f64,
    pub record: CheckoutRecord,
}

/// GET /api/checkout/:stay_id/preview - 结算预览
pub async fn preview(
    State(state): State<AppState>,
    Path(stay_id): Path<i64>,
) -> AppResult<Json<AppResponse<CheckoutPreview>>> {
    let now = Local::now().naive_local();
    let flow = CheckoutFlow::load(&state.providers, stay_id, now).await?;

    Ok(ok(CheckoutPreview {
        stay_id,
        state: flow.state(),
        balance_due: flow.balance_due(),
        total_paid: flow.ledger().total_completed(),
        is_late_checkout: flow.is_late_checkout(),
        deposit_required: flow.deposit().required(),
        deposit_settled: flow.is_deposit_settled(),
        breakdown: flow.breakdown().clone(),
    }))
}

/// POST /api/checkout/:stay_id/deposit-refund - 退还房卡押金
pub async fn deposit_refund(
    State(state): State<AppState>,
    Path(stay_id): Path<i64>,
    Json(payload): Json<DepositRefundRequest>,
) -> AppResult<Json<AppResponse<Payment>>> {
    let now = Local::now().naive_local();
    let flow = CheckoutFlow::load(&state.providers, stay_id, now).await?;

    let payment = flow
        .deposit()
        .refund(state.providers.payments.as_ref(), flow.ledger(), payload.method)
        .await?;

    Ok(ok(payment))
}

/// POST /api/checkout/:stay_id/complete - 走完结算流程并退房
///
/// 服务端代替操作员把状态机走到底：押金未结清、或对非晚退房传入罚金，
/// 都会在任何外部调用发生前被拒绝。
pub async fn complete(
    State(state): State<AppState>,
    Path(stay_id): Path<i64>,
    Json(payload): Json<CompleteRequest>,
) -> AppResult<Json<AppResponse<CheckoutResult>>> {
    let now = Local::now().naive_local();
    let mut flow = CheckoutFlow::load(&state.providers, stay_id, now).await?;

    let penalty = payload.penalty.unwrap_or(0.0);
    if !flow.is_late_checkout() && penalty > 0.0 {
        return Err(AppError::BusinessRule(format!(
            "stay {} is not a late checkout; penalty not applicable",
            stay_id
        )));
    }

    // Preview → (LateCheckout) → Confirm
    flow.advance()?;
    if flow.state() == CheckoutState::LateCheckout {
        flow.set_late_checkout(penalty, payload.notes.clone())?;
        flow.advance()?;
    }

    let completion = flow.complete(&state.providers, now.date()).await?;

    let result = CheckoutResult {
        stay_id,
        state: flow.state(),
        breakdown: completion.breakdown,
        balance_due: completion.balance_due,
        record: completion.record,
    };

    match completion.warning {
        Some(warning) => Ok(ok_with_warning(result, warning)),
        None => Ok(ok(result)),
    }
}
