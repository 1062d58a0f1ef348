//! End-to-end walk: settle a guest, run the night audit, read the report
//!
//! Drives the public crate API against the in-memory providers the way the
//! dashboard drives the HTTP surface.

use std::sync::Arc;

use chrono::NaiveDate;

use desk_server::billing::{CheckoutFlow, CheckoutState};
use desk_server::night_audit::{AuditError, NightAuditPoster};
use desk_server::providers::{MemoryProviders, PaymentProvider, Providers};
use shared::models::{
    HotelSettings, Membership, PaymentCreate, PaymentMethod, Room, RoomStatus, Stay, StayStatus,
    TouristClass,
};

fn settings() -> HotelSettings {
    HotelSettings {
        service_tax_rate: 6.0,
        tourism_tax_rate: 10.0,
        room_card_deposit: 50.0,
        check_out_time: "12:00".to_string(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_stay(id: i64, room_id: i64) -> Stay {
    Stay {
        id,
        stay_number: format!("BK-{:04}", id),
        guest_id: id * 10,
        guest_name: format!("Guest {}", id),
        room_id,
        room_number: format!("10{}", room_id),
        check_in_date: date(2025, 3, 10),
        check_out_date: date(2025, 3, 12),
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
        created_at: chrono::Utc::now(),
    }
}

fn seed_room(id: i64, status: RoomStatus) -> Room {
    Room {
        id,
        room_number: format!("10{}", id),
        list_price: 120.0,
        status,
    }
}

fn build_world() -> (Arc<MemoryProviders>, Providers) {
    let backend = Arc::new(MemoryProviders::new(settings()));
    backend.insert_room(seed_room(1, RoomStatus::Occupied));
    backend.insert_room(seed_room(2, RoomStatus::Available));
    backend.insert_stay(seed_stay(1, 1));
    let providers = Providers::in_memory(backend.clone());
    (backend, providers)
}

#[tokio::test]
async fn checkout_then_audit_full_day() {
    let (backend, providers) = build_world();
    let audit_day = date(2025, 3, 12);
    let before_cutoff = audit_day.and_hms_opt(11, 0, 0).unwrap();

    // --- Checkout: the documented reference scenario ---
    // rate 100 incl. 6% tax, 2 nights, foreign non-member, tourism 10/night
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

    let mut flow = CheckoutFlow::load(&providers, 1, before_cutoff).await.unwrap();
    let breakdown = flow.breakdown();
    assert_eq!(breakdown.room_charge, 188.68);
    assert_eq!(breakdown.service_tax, 11.32);
    assert_eq!(breakdown.tourism_tax, 20.0);
    assert_eq!(breakdown.grand_total, 220.0);
    assert_eq!(flow.balance_due(), 70.0);
    assert_eq!(breakdown.deposit_required, 50.0);

    // Deposit gate holds until the refund is on the ledger
    assert!(flow.advance().is_err());
    flow.deposit()
        .refund(providers.payments.as_ref(), flow.ledger(), PaymentMethod::Cash)
        .await
        .unwrap();
    let payments = providers.payments.payments_for_stay(1).await.unwrap();
    flow.reload_payments(payments);

    // Refund is a separate Refunded record; the completed total is untouched
    assert_eq!(flow.balance_due(), 70.0);

    assert_eq!(flow.advance().unwrap(), CheckoutState::Confirm);
    let completion = flow.complete(&providers, audit_day).await.unwrap();
    assert!(completion.warning.is_none());

    assert_eq!(backend.stay_by_id(1).unwrap().status, StayStatus::CheckedOut);
    assert_eq!(backend.room_by_id(1).unwrap().status, RoomStatus::Dirty);

    // --- Night audit over the same day ---
    let poster = NightAuditPoster::new(providers.clone());

    let preview = poster.preview(audit_day).await.unwrap();
    assert!(preview.can_run);
    assert_eq!(preview.total_unposted, 1);
    assert_eq!(preview.estimated_revenue, 200.0);

    let run = poster
        .run(audit_day, Some("end of day".to_string()), Some("night shift".to_string()))
        .await
        .unwrap();
    assert_eq!(run.total_bookings_posted, 1);
    assert_eq!(run.total_checkouts, 1);
    assert_eq!(run.total_revenue, 200.0);

    // The run locked the stay and the date
    assert!(backend.stay_by_id(1).unwrap().is_posted);
    let again = poster.run(audit_day, None, None).await;
    assert!(matches!(again, Err(AuditError::AlreadyRun { .. })));

    let after = poster.preview(audit_day).await.unwrap();
    assert!(after.already_run);
    assert_eq!(after.total_unposted, 0);

    // Reporting surface sees the posted stay
    let detail = poster.detail(run.id).await.unwrap();
    assert_eq!(detail.posted_stays.len(), 1);
    assert_eq!(detail.posted_stays[0].stay_id, 1);
    assert_eq!(detail.posted_stays[0].nights, 2);
}

#[tokio::test]
async fn company_billed_checkout_posts_receivable_and_skips_deposit() {
    let (backend, providers) = build_world();
    let audit_day = date(2025, 3, 12);

    let mut stay = seed_stay(2, 2);
    stay.company_id = Some(9);
    stay.company_name = Some("Borneo Tours Sdn Bhd".to_string());
    backend.insert_stay(stay);

    let now = audit_day.and_hms_opt(10, 0, 0).unwrap();
    let mut flow = CheckoutFlow::load(&providers, 2, now).await.unwrap();

    // Company billing waives the deposit outright
    assert_eq!(flow.breakdown().deposit_required, 0.0);
    assert!(flow.is_deposit_settled());

    flow.advance().unwrap();
    let completion = flow.complete(&providers, audit_day).await.unwrap();
    assert!(completion.warning.is_none());

    let entries = backend.ledger_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].company_id, 9);
    assert_eq!(entries[0].amount, completion.breakdown.grand_total);
    assert_eq!(entries[0].posting_date, audit_day);
}
