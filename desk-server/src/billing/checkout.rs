//! Checkout reconciliation flow
//!
//! An explicit state machine replaces the dialog-flag spaghetti a front desk
//! UI tends to grow: every suspension point and every illegal transition is
//! enumerable and testable without a UI framework.
//!
//! ```text
//! Preview → (LateCheckout, only when past the cutoff) → Confirm → Completed
//! ```
//!
//! Backward moves (Confirm → LateCheckout → Preview) are allowed and keep
//! the penalty and notes the operator already entered.
//!
//! Until `complete()` succeeds the flow has no side effects; abandoning it
//! at any earlier state leaves the remote systems untouched.

use chrono::{NaiveDateTime, NaiveTime};

use shared::models::{
    ChargeBreakdown, CheckoutRecord, HotelSettings, Payment, Room, RoomStatus, Stay, StayStatus,
};

use crate::billing::company::CompanyLedgerPoster;
use crate::billing::deposit::DepositManager;
use crate::billing::ledger::PaymentLedger;
use crate::billing::money::validate_penalty;
use crate::billing::tariff::TariffCalculator;
use crate::billing::{BillingError, BillingResult};
use crate::providers::Providers;

/// Checkout flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Preview,
    LateCheckout,
    Confirm,
    Completed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Preview => "preview",
            CheckoutState::LateCheckout => "late_checkout",
            CheckoutState::Confirm => "confirm",
            CheckoutState::Completed => "completed",
        }
    }
}

/// Result of a completed checkout
#[derive(Debug, Clone)]
pub struct CheckoutCompletion {
    pub record: CheckoutRecord,
    pub breakdown: ChargeBreakdown,
    pub balance_due: f64,
    /// Non-fatal failure of the company-ledger posting, if any
    pub warning: Option<String>,
}

/// Parse the "HH:MM" checkout cutoff from hotel settings
fn parse_cutoff(settings: &HotelSettings) -> BillingResult<NaiveTime> {
    NaiveTime::parse_from_str(&settings.check_out_time, "%H:%M").map_err(|_| {
        BillingError::InvalidOperation(format!(
            "unparseable check_out_time in hotel settings: {:?}",
            settings.check_out_time
        ))
    })
}

/// Late checkout: the stay checks out today and the cutoff has passed
///
/// A stay whose checkout date is already in the past is overdue, not late;
/// the penalty step only applies on the checkout day itself.
pub fn is_late_checkout(
    stay: &Stay,
    settings: &HotelSettings,
    now: NaiveDateTime,
) -> BillingResult<bool> {
    let cutoff = parse_cutoff(settings)?;
    Ok(stay.check_out_date == now.date() && now.time() > cutoff)
}

/// Operator-facing checkout reconciliation for one stay
///
/// The working copy of the stay lives here for the duration of the
/// Preview → Completed walk; all persistent state stays with the providers.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    stay: Stay,
    room: Room,
    settings: HotelSettings,
    ledger: PaymentLedger,
    deposit: DepositManager,
    state: CheckoutState,
    is_late_checkout: bool,
    penalty: f64,
    notes: Option<String>,
    breakdown: ChargeBreakdown,
}

impl CheckoutFlow {
    /// Build a flow in Preview state
    ///
    /// Computes the breakdown with penalty 0 and decides whether the
    /// late-checkout step applies. `now` is injected so the cutoff rule is
    /// testable against a fixed clock.
    pub fn begin(
        stay: Stay,
        room: Room,
        settings: HotelSettings,
        payments: Vec<Payment>,
        now: NaiveDateTime,
    ) -> BillingResult<Self> {
        let calculator = TariffCalculator::new(&settings);
        let breakdown = calculator.breakdown(&stay, &room, 0.0)?;
        let is_late = is_late_checkout(&stay, &settings, now)?;

        let ledger = PaymentLedger::new(payments);
        let deposit = DepositManager::new(stay.id, breakdown.deposit_required);

        tracing::debug!(
            stay_id = stay.id,
            grand_total = breakdown.grand_total,
            is_late_checkout = is_late,
            "checkout preview computed"
        );

        Ok(Self {
            stay,
            room,
            settings,
            ledger,
            deposit,
            state: CheckoutState::Preview,
            is_late_checkout: is_late,
            penalty: 0.0,
            notes: None,
            breakdown,
        })
    }

    /// Fetch everything the flow needs and build it in Preview state
    pub async fn load(
        providers: &Providers,
        stay_id: i64,
        now: NaiveDateTime,
    ) -> BillingResult<Self> {
        let stay = providers.stays.stay(stay_id).await?;
        let room = providers.stays.room(stay.room_id).await?;
        let settings = providers.settings.hotel_settings().await?;
        let payments = providers.payments.payments_for_stay(stay_id).await?;
        Self::begin(stay, room, settings, payments, now)
    }

    // ========== Accessors ==========

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn stay(&self) -> &Stay {
        &self.stay
    }

    pub fn breakdown(&self) -> &ChargeBreakdown {
        &self.breakdown
    }

    pub fn balance_due(&self) -> f64 {
        self.ledger.balance_due(self.breakdown.grand_total)
    }

    pub fn is_late_checkout(&self) -> bool {
        self.is_late_checkout
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn deposit(&self) -> &DepositManager {
        &self.deposit
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    /// True when no deposit is owed or it has been returned
    pub fn is_deposit_settled(&self) -> bool {
        self.deposit.is_settled(&self.ledger)
    }

    /// Refresh the payment view (e.g. after a deposit refund was recorded)
    pub fn reload_payments(&mut self, payments: Vec<Payment>) {
        self.ledger = PaymentLedger::new(payments);
    }

    // ========== Transitions ==========

    /// Move forward one state
    ///
    /// Preview may not be left while a deposit is owed and unsettled.
    /// Completing out of Confirm goes through [`Self::complete`], which
    /// performs the external mutations.
    pub fn advance(&mut self) -> BillingResult<CheckoutState> {
        let next = match self.state {
            CheckoutState::Preview => {
                if !self.is_deposit_settled() {
                    return Err(BillingError::DepositOutstanding {
                        amount: self.deposit.required(),
                    });
                }
                if self.is_late_checkout {
                    CheckoutState::LateCheckout
                } else {
                    CheckoutState::Confirm
                }
            }
            CheckoutState::LateCheckout => {
                // Penalty has been applied through set_late_checkout (or
                // left at the default 0); breakdown is already current
                CheckoutState::Confirm
            }
            CheckoutState::Confirm => {
                return Err(BillingError::IllegalTransition {
                    from: "confirm",
                    to: "completed (use complete())",
                });
            }
            CheckoutState::Completed => {
                return Err(BillingError::IllegalTransition {
                    from: "completed",
                    to: "completed",
                });
            }
        };

        tracing::debug!(
            stay_id = self.stay.id,
            from = self.state.as_str(),
            to = next.as_str(),
            "checkout transition"
        );
        self.state = next;
        Ok(next)
    }

    /// Move backward one state, keeping entered penalty and notes
    pub fn back(&mut self) -> BillingResult<CheckoutState> {
        let prev = match self.state {
            CheckoutState::Confirm => {
                if self.is_late_checkout {
                    CheckoutState::LateCheckout
                } else {
                    CheckoutState::Preview
                }
            }
            CheckoutState::LateCheckout => CheckoutState::Preview,
            CheckoutState::Preview => {
                return Err(BillingError::IllegalTransition {
                    from: "preview",
                    to: "preview",
                });
            }
            CheckoutState::Completed => {
                return Err(BillingError::IllegalTransition {
                    from: "completed",
                    to: "confirm",
                });
            }
        };

        self.state = prev;
        Ok(prev)
    }

    /// Record the operator-supplied late-checkout penalty and notes
    ///
    /// Only meaningful in the LateCheckout state; the breakdown is
    /// recomputed with the penalty before the flow may advance.
    pub fn set_late_checkout(
        &mut self,
        penalty: f64,
        notes: Option<String>,
    ) -> BillingResult<()> {
        if self.state != CheckoutState::LateCheckout {
            return Err(BillingError::IllegalTransition {
                from: self.state.as_str(),
                to: "late_checkout",
            });
        }
        validate_penalty(penalty)?;

        self.penalty = penalty;
        self.notes = notes;
        self.recompute()
    }

    fn recompute(&mut self) -> BillingResult<()> {
        let calculator = TariffCalculator::new(&self.settings);
        self.breakdown = calculator.breakdown(&self.stay, &self.room, self.penalty)?;
        Ok(())
    }

    /// Finalize the checkout
    ///
    /// Requires the Confirm state. Invokes the external checkout mutation,
    /// then, in order: booking status to checked_out, room status to dirty,
    /// and for company-billed stays the company-ledger posting. The ledger
    /// posting is best effort: its failure is logged and returned as a
    /// warning, never rolled back into the guest-facing checkout.
    pub async fn complete(
        &mut self,
        providers: &Providers,
        posting_date: chrono::NaiveDate,
    ) -> BillingResult<CheckoutCompletion> {
        if self.state != CheckoutState::Confirm {
            return Err(BillingError::IllegalTransition {
                from: self.state.as_str(),
                to: "completed",
            });
        }
        match self.stay.status {
            StayStatus::CheckedIn => {}
            StayStatus::CheckedOut => {
                return Err(BillingError::AlreadyCheckedOut(self.stay.id));
            }
            other => {
                return Err(BillingError::InvalidOperation(format!(
                    "stay {} cannot check out from status {}",
                    self.stay.id, other
                )));
            }
        }

        // 1. The checkout mutation itself; penalty/notes only when charged
        let record = CheckoutRecord {
            stay_id: self.stay.id,
            grand_total: self.breakdown.grand_total,
            late_checkout_penalty: (self.penalty > 0.0).then_some(self.penalty),
            late_checkout_notes: if self.penalty > 0.0 {
                self.notes.clone()
            } else {
                None
            },
        };
        providers.stays.record_checkout(&record).await?;

        self.state = CheckoutState::Completed;

        // 2. Booking leaves the house
        providers
            .stays
            .set_stay_status(self.stay.id, StayStatus::CheckedOut)
            .await?;

        // 3. Room turns over before any back-office posting
        providers
            .stays
            .set_room_status(self.stay.room_id, RoomStatus::Dirty)
            .await?;

        // 4. Company posting is best effort
        let mut warning = None;
        if self.stay.is_company_billed() {
            match CompanyLedgerPoster::post(
                providers.company_ledger.as_ref(),
                &self.stay,
                &self.breakdown,
                posting_date,
            )
            .await
            {
                Ok(entry) => {
                    tracing::info!(
                        stay_id = self.stay.id,
                        entry_id = entry.id,
                        "company ledger entry created"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        stay_id = self.stay.id,
                        error = %e,
                        "company ledger posting failed; checkout stands"
                    );
                    warning = Some(format!(
                        "checkout completed but company ledger posting failed: {}",
                        e
                    ));
                }
            }
        }

        tracing::info!(
            stay_id = self.stay.id,
            grand_total = self.breakdown.grand_total,
            balance_due = self.balance_due(),
            "checkout completed"
        );

        Ok(CheckoutCompletion {
            record,
            breakdown: self.breakdown.clone(),
            balance_due: self.balance_due(),
            warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;

    use shared::models::{
        Membership, PaymentCreate, PaymentMethod, TouristClass,
    };

    use crate::providers::{MemoryProviders, PaymentProvider};

    fn test_settings() -> HotelSettings {
        HotelSettings {
            service_tax_rate: 6.0,
            tourism_tax_rate: 10.0,
            room_card_deposit: 50.0,
            check_out_time: "12:00".to_string(),
        }
    }

    fn test_room() -> Room {
        Room {
            id: 7,
            room_number: "203".to_string(),
            list_price: 120.0,
            status: RoomStatus::Occupied,
        }
    }

    fn test_stay() -> Stay {
        Stay {
            id: 1,
            stay_number: "BK-0001".to_string(),
            guest_id: 11,
            guest_name: "Aina Rahman".to_string(),
            room_id: 7,
            room_number: "203".to_string(),
            check_in_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            nightly_rate: 100.0,
            total_amount: 200.0,
            status: StayStatus::CheckedIn,
            tourist_class: TouristClass::Foreign,
            membership: Membership::NonMember,
            tourism_tax_amount: None,
            extra_bed_charge: None,
            company_id: None,
            company_name: None,
            payment_method: Some("card".to_string()),
            source: Some("walk_in".to_string()),
            is_posted: false,
            posted_date: None,
            created_at: Utc::now(),
        }
    }

    fn at(date: NaiveDate, hh: u32, mm: u32) -> NaiveDateTime {
        date.and_hms_opt(hh, mm, 0).unwrap()
    }

    fn checkout_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    /// Seed a memory backend with the standard stay/room and build providers
    fn test_providers(stay: Stay) -> (Arc<MemoryProviders>, Providers) {
        let backend = Arc::new(MemoryProviders::new(test_settings()));
        backend.insert_room(test_room());
        backend.insert_stay(stay);
        let providers = Providers::in_memory(backend.clone());
        (backend, providers)
    }

    // ========== Late checkout detection ==========

    #[test]
    fn test_late_checkout_past_cutoff() {
        let stay = test_stay();
        let now = at(checkout_day(), 13, 0);
        assert!(is_late_checkout(&stay, &test_settings(), now).unwrap());
    }

    #[test]
    fn test_not_late_before_cutoff() {
        let stay = test_stay();
        let now = at(checkout_day(), 11, 0);
        assert!(!is_late_checkout(&stay, &test_settings(), now).unwrap());
    }

    #[test]
    fn test_not_late_when_checkout_was_yesterday() {
        let stay = test_stay();
        let now = at(checkout_day() + chrono::Days::new(1), 23, 0);
        assert!(!is_late_checkout(&stay, &test_settings(), now).unwrap());
    }

    #[test]
    fn test_unparseable_cutoff_is_an_error() {
        let mut settings = test_settings();
        settings.check_out_time = "noonish".to_string();
        let result = is_late_checkout(&test_stay(), &settings, at(checkout_day(), 13, 0));
        assert!(result.is_err());
    }

    // ========== State machine ==========

    #[test]
    fn test_member_flow_skips_deposit_gate() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;

        let mut flow = CheckoutFlow::begin(
            stay,
            test_room(),
            test_settings(),
            vec![],
            at(checkout_day(), 11, 0),
        )
        .unwrap();

        assert_eq!(flow.state(), CheckoutState::Preview);
        assert!(flow.is_deposit_settled());
        assert_eq!(flow.advance().unwrap(), CheckoutState::Confirm);
    }

    #[test]
    fn test_deposit_gate_blocks_preview_exit() {
        let mut flow = CheckoutFlow::begin(
            test_stay(),
            test_room(),
            test_settings(),
            vec![],
            at(checkout_day(), 11, 0),
        )
        .unwrap();

        assert!(matches!(
            flow.advance(),
            Err(BillingError::DepositOutstanding { amount }) if amount == 50.0
        ));
        assert_eq!(flow.state(), CheckoutState::Preview);
    }

    #[tokio::test]
    async fn test_deposit_refund_unblocks_flow() {
        let (_backend, providers) = test_providers(test_stay());

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        assert!(!flow.is_deposit_settled());

        flow.deposit()
            .refund(
                providers.payments.as_ref(),
                flow.ledger(),
                PaymentMethod::Cash,
            )
            .await
            .unwrap();

        let payments = providers.payments.payments_for_stay(1).await.unwrap();
        flow.reload_payments(payments);
        assert!(flow.is_deposit_settled());
        assert_eq!(flow.advance().unwrap(), CheckoutState::Confirm);
    }

    #[test]
    fn test_late_flow_walks_penalty_step() {
        let mut stay = test_stay();
        stay.membership = Membership::Member; // skip the deposit gate

        let mut flow = CheckoutFlow::begin(
            stay,
            test_room(),
            test_settings(),
            vec![],
            at(checkout_day(), 14, 30),
        )
        .unwrap();

        assert!(flow.is_late_checkout());
        assert_eq!(flow.advance().unwrap(), CheckoutState::LateCheckout);

        flow.set_late_checkout(30.0, Some("flight delayed".to_string()))
            .unwrap();
        assert_eq!(flow.breakdown().late_checkout_penalty, 30.0);
        assert_eq!(flow.breakdown().grand_total, 250.0); // 220 + 30

        assert_eq!(flow.advance().unwrap(), CheckoutState::Confirm);
    }

    #[test]
    fn test_backward_transitions_keep_penalty_and_notes() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;

        let mut flow = CheckoutFlow::begin(
            stay,
            test_room(),
            test_settings(),
            vec![],
            at(checkout_day(), 14, 30),
        )
        .unwrap();

        flow.advance().unwrap();
        flow.set_late_checkout(30.0, Some("flight delayed".to_string()))
            .unwrap();
        flow.advance().unwrap();
        assert_eq!(flow.state(), CheckoutState::Confirm);

        // Confirm → LateCheckout → Preview and back again
        assert_eq!(flow.back().unwrap(), CheckoutState::LateCheckout);
        assert_eq!(flow.penalty(), 30.0);
        assert_eq!(flow.notes(), Some("flight delayed"));
        assert_eq!(flow.back().unwrap(), CheckoutState::Preview);

        flow.advance().unwrap();
        assert_eq!(flow.penalty(), 30.0, "penalty survives the round trip");
        assert_eq!(flow.breakdown().grand_total, 250.0);
    }

    #[test]
    fn test_set_penalty_outside_late_state_is_illegal() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;

        let mut flow = CheckoutFlow::begin(
            stay,
            test_room(),
            test_settings(),
            vec![],
            at(checkout_day(), 11, 0),
        )
        .unwrap();

        assert!(matches!(
            flow.set_late_checkout(30.0, None),
            Err(BillingError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_requires_confirm_state() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;
        let (_backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();

        let result = flow.complete(&providers, checkout_day()).await;
        assert!(matches!(
            result,
            Err(BillingError::IllegalTransition { from: "preview", .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_rejects_already_checked_out_stay() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;
        stay.status = StayStatus::CheckedOut;
        let (_backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        flow.advance().unwrap();

        let result = flow.complete(&providers, checkout_day()).await;
        assert!(matches!(result, Err(BillingError::AlreadyCheckedOut(1))));
    }

    #[tokio::test]
    async fn test_complete_flips_stay_and_room_status() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;
        let (backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        flow.advance().unwrap();

        let completion = flow.complete(&providers, checkout_day()).await.unwrap();
        assert_eq!(flow.state(), CheckoutState::Completed);
        assert!(completion.warning.is_none());
        assert_eq!(completion.record.late_checkout_penalty, None);

        assert_eq!(backend.stay_by_id(1).unwrap().status, StayStatus::CheckedOut);
        assert_eq!(backend.room_by_id(7).unwrap().status, RoomStatus::Dirty);
        assert_eq!(backend.checkout_records().len(), 1);
        assert!(backend.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn test_complete_posts_company_ledger_for_company_stay() {
        let mut stay = test_stay();
        stay.company_id = Some(3);
        stay.company_name = Some("Acme Sdn Bhd".to_string());
        let (backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        // Company billing waives the deposit, so Preview advances directly
        assert!(flow.is_deposit_settled());
        flow.advance().unwrap();

        let completion = flow.complete(&providers, checkout_day()).await.unwrap();
        assert!(completion.warning.is_none());

        let entries = backend.ledger_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company_id, 3);
        assert_eq!(entries[0].stay_id, 1);
        assert_eq!(entries[0].amount, completion.breakdown.grand_total);
    }

    #[tokio::test]
    async fn test_company_posting_failure_is_a_warning_not_a_rollback() {
        let mut stay = test_stay();
        stay.company_id = Some(3);
        let (backend, providers) = test_providers(stay);
        backend.fail_next_company_posting();

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        flow.advance().unwrap();

        let completion = flow.complete(&providers, checkout_day()).await.unwrap();
        assert!(completion.warning.is_some());

        // Guest-facing state already turned over
        assert_eq!(backend.stay_by_id(1).unwrap().status, StayStatus::CheckedOut);
        assert_eq!(backend.room_by_id(7).unwrap().status, RoomStatus::Dirty);
        assert!(backend.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_flow_has_no_side_effects() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;
        let (backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 14, 0))
            .await
            .unwrap();
        flow.advance().unwrap();
        flow.set_late_checkout(30.0, None).unwrap();
        drop(flow);

        assert_eq!(backend.stay_by_id(1).unwrap().status, StayStatus::CheckedIn);
        assert!(backend.checkout_records().is_empty());
    }

    #[tokio::test]
    async fn test_penalty_travels_with_the_checkout_record() {
        let mut stay = test_stay();
        stay.membership = Membership::Member;
        let (backend, providers) = test_providers(stay);

        let mut flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 14, 0))
            .await
            .unwrap();
        flow.advance().unwrap();
        flow.set_late_checkout(30.0, Some("flight delayed".to_string()))
            .unwrap();
        flow.advance().unwrap();

        let completion = flow.complete(&providers, checkout_day()).await.unwrap();
        assert_eq!(completion.record.late_checkout_penalty, Some(30.0));
        assert_eq!(
            completion.record.late_checkout_notes.as_deref(),
            Some("flight delayed")
        );

        let records = backend.checkout_records();
        assert_eq!(records[0].grand_total, 250.0);
    }

    #[tokio::test]
    async fn test_balance_reflects_recorded_payments() {
        let (_backend, providers) = test_providers(test_stay());

        // One 150 payment against the 220 bill
        providers
            .payments
            .record_payment(&PaymentCreate {
                stay_id: 1,
                amount: 150.0,
                method: PaymentMethod::Card,
                is_deposit: false,
                reference: None,
                notes: None,
            })
            .await
            .unwrap();

        let flow = CheckoutFlow::load(&providers, 1, at(checkout_day(), 11, 0))
            .await
            .unwrap();
        assert_eq!(flow.breakdown().grand_total, 220.0);
        assert_eq!(flow.balance_due(), 70.0);
    }
}
