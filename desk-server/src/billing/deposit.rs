//! Deposit settlement
//!
//! Tracks whether a stay's refundable room-card deposit has been returned.
//! The refund is a side-effecting call against the payment provider; the
//! `is_settled` guard stops the common double-refund case client-side, the
//! provider rejects the rest (two operators racing).

use shared::models::{Payment, PaymentCreate, PaymentMethod};

use crate::billing::ledger::PaymentLedger;
use crate::billing::{BillingError, BillingResult};
use crate::providers::PaymentProvider;

/// Deposit settlement tracker for one stay
#[derive(Debug, Clone)]
pub struct DepositManager {
    stay_id: i64,
    required: f64,
}

impl DepositManager {
    pub fn new(stay_id: i64, required: f64) -> Self {
        Self { stay_id, required }
    }

    pub fn required(&self) -> f64 {
        self.required
    }

    /// Settled when no deposit is owed, or a matching refund record exists
    pub fn is_settled(&self, ledger: &PaymentLedger) -> bool {
        self.required <= 0.0 || ledger.deposit_refunded()
    }

    /// Return the deposit to the guest
    ///
    /// Produces a new refund Payment through the provider. Must not be
    /// invocable twice for the same stay.
    pub async fn refund(
        &self,
        provider: &dyn PaymentProvider,
        ledger: &PaymentLedger,
        method: PaymentMethod,
    ) -> BillingResult<Payment> {
        if self.required <= 0.0 {
            return Err(BillingError::InvalidOperation(format!(
                "stay {} owes no deposit",
                self.stay_id
            )));
        }
        if self.is_settled(ledger) {
            return Err(BillingError::DepositAlreadyRefunded {
                stay_id: self.stay_id,
            });
        }

        let create = PaymentCreate {
            stay_id: self.stay_id,
            amount: self.required,
            method,
            is_deposit: true,
            reference: Some(format!("DEP-{}", uuid::Uuid::new_v4())),
            notes: Some("room card deposit refund".to_string()),
        };

        tracing::info!(
            stay_id = self.stay_id,
            amount = self.required,
            method = %method,
            "refunding room card deposit"
        );

        let payment = provider.record_refund(&create).await?;
        Ok(payment)
    }
}
