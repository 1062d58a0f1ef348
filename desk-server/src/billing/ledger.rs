//! Payment ledger
//!
//! An in-memory view over a stay's append-only payment history. Completed
//! payments count toward the balance; refunds are separate records with
//! status `Refunded` and never reduce the completed total.

use rust_decimal::Decimal;

use shared::models::{Payment, PaymentStatus};

use crate::billing::money::{to_decimal, to_money, validate_payment_amount};
use crate::billing::BillingResult;

/// Ledger of payments recorded against a single stay
#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    payments: Vec<Payment>,
}

impl PaymentLedger {
    pub fn new(payments: Vec<Payment>) -> Self {
        Self { payments }
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Append a payment
    ///
    /// Rejects non-positive amounts before the record enters the ledger.
    pub fn record(&mut self, payment: Payment) -> BillingResult<()> {
        validate_payment_amount(payment.amount)?;
        self.payments.push(payment);
        Ok(())
    }

    /// Sum of amounts with status `Completed`
    pub fn total_completed(&self) -> f64 {
        let total: Decimal = self
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| to_decimal(p.amount))
            .sum();
        to_money(total)
    }

    /// Outstanding balance against a grand total
    ///
    /// Negative means overpayment; callers surface it, never clamp it.
    pub fn balance_due(&self, grand_total: f64) -> f64 {
        to_money(to_decimal(grand_total) - to_decimal(self.total_completed()))
    }

    /// Whether a deposit-refund record exists (status Refunded, deposit tag)
    pub fn deposit_refunded(&self) -> bool {
        self.payments
            .iter()
            .any(|p| p.is_deposit && p.status == PaymentStatus::Refunded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::PaymentMethod;

    fn payment(amount: f64, status: PaymentStatus, is_deposit: bool) -> Payment {
        Payment {
            id: 0,
            stay_id: 1,
            amount,
            method: PaymentMethod::Cash,
            status,
            is_deposit,
            reference: None,
            notes: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_due_after_payments() {
        let mut ledger = PaymentLedger::default();
        ledger.record(payment(150.0, PaymentStatus::Completed, false)).unwrap();
        ledger.record(payment(20.0, PaymentStatus::Completed, false)).unwrap();

        assert_eq!(ledger.total_completed(), 170.0);
        assert_eq!(ledger.balance_due(220.0), 50.0);
    }

    #[test]
    fn test_overpayment_surfaces_as_negative_balance() {
        let mut ledger = PaymentLedger::default();
        ledger.record(payment(300.0, PaymentStatus::Completed, false)).unwrap();

        assert_eq!(ledger.balance_due(220.0), -80.0);
    }

    #[test]
    fn test_refunds_do_not_change_completed_total() {
        let mut ledger = PaymentLedger::default();
        ledger.record(payment(150.0, PaymentStatus::Completed, false)).unwrap();
        let before = ledger.total_completed();

        ledger.record(payment(50.0, PaymentStatus::Refunded, true)).unwrap();
        assert_eq!(ledger.total_completed(), before);
        assert_eq!(ledger.balance_due(220.0), 70.0);
    }

    #[test]
    fn test_record_rejects_non_positive_amount() {
        let mut ledger = PaymentLedger::default();
        assert!(ledger.record(payment(0.0, PaymentStatus::Completed, false)).is_err());
        assert!(ledger.record(payment(-10.0, PaymentStatus::Completed, false)).is_err());
        assert!(ledger.payments().is_empty());
    }

    #[test]
    fn test_deposit_refund_detection() {
        let mut ledger = PaymentLedger::default();
        assert!(!ledger.deposit_refunded());

        // A completed deposit collection is not a refund
        ledger.record(payment(50.0, PaymentStatus::Completed, true)).unwrap();
        assert!(!ledger.deposit_refunded());

        ledger.record(payment(50.0, PaymentStatus::Refunded, true)).unwrap();
        assert!(ledger.deposit_refunded());
    }

    #[test]
    fn test_decimal_sum_has_no_drift() {
        let mut ledger = PaymentLedger::default();
        for _ in 0..10 {
            ledger.record(payment(0.1, PaymentStatus::Completed, false)).unwrap();
        }
        assert_eq!(ledger.total_completed(), 1.0);
        assert_eq!(ledger.balance_due(1.0), 0.0);
    }
}
