//! Checkout Billing Module
//!
//! This module implements checkout reconciliation for the front desk:
//!
//! - **money**: precise decimal arithmetic helpers
//! - **tariff**: ChargeBreakdown computation from a stay + hotel settings
//! - **ledger**: append-only payment ledger view (balance due)
//! - **deposit**: room-card deposit settlement tracking
//! - **checkout**: the Preview → LateCheckout → Confirm → Completed flow
//! - **company**: corporate receivable posting for company-billed stays
//!
//! # Data Flow
//!
//! 1. Operator picks a stay → `CheckoutFlow::begin` fetches settings/payments
//! 2. TariffCalculator derives the ChargeBreakdown (penalty 0)
//! 3. PaymentLedger/DepositManager report balance and deposit status
//! 4. Operator walks the state machine; Completed drives the external
//!    mutations (booking → checked_out, room → dirty, company ledger)

pub mod checkout;
pub mod company;
pub mod deposit;
pub mod ledger;
pub mod money;
pub mod tariff;

// Re-exports
pub use checkout::{CheckoutCompletion, CheckoutFlow, CheckoutState};
pub use company::CompanyLedgerPoster;
pub use deposit::DepositManager;
pub use ledger::PaymentLedger;
pub use tariff::TariffCalculator;

use crate::providers::ProviderError;

/// Billing domain errors
///
/// Input errors are rejected synchronously, before any network call.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("stay spans {nights} nights; check-out must be after check-in")]
    InvalidStayDates { nights: i64 },

    #[error("stay {stay_id} has no usable nightly rate (rate, list price and total amount all absent)")]
    MissingRate { stay_id: i64 },

    #[error("amount must be a positive finite number")]
    InvalidAmount,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("stay {0} is already checked out")]
    AlreadyCheckedOut(i64),

    #[error("deposit for stay {stay_id} has already been refunded")]
    DepositAlreadyRefunded { stay_id: i64 },

    #[error("room-card deposit of {amount:.2} must be settled before checkout can proceed")]
    DepositOutstanding { amount: f64 },

    #[error("illegal checkout transition: {from} -> {to}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type BillingResult<T> = Result<T, BillingError>;
