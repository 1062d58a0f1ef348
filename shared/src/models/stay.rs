//! Stay Model (住宿预订)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stay lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayStatus {
    Reserved,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl std::fmt::Display for StayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StayStatus::Reserved => write!(f, "reserved"),
            StayStatus::CheckedIn => write!(f, "checked_in"),
            StayStatus::CheckedOut => write!(f, "checked_out"),
            StayStatus::Cancelled => write!(f, "cancelled"),
            StayStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Tourism classification of the occupant
///
/// Tourism tax applies to foreign guests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouristClass {
    Domestic,
    Foreign,
}

/// Membership classification of the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Member,
    NonMember,
}

/// A booked room occupancy (会员/散客住宿记录)
///
/// Owned by the remote hotel API; desk-server reads it and requests
/// mutations, it never persists stays itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stay {
    pub id: i64,
    pub stay_number: String,
    pub guest_id: i64,
    pub guest_name: String,
    pub room_id: i64,
    pub room_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Nightly rate, tax-inclusive
    pub nightly_rate: f64,
    /// Total booked amount as recorded by the booking system
    pub total_amount: f64,
    pub status: StayStatus,
    pub tourist_class: TouristClass,
    pub membership: Membership,
    /// Stored tourism tax override; wins over the per-night rate when positive
    pub tourism_tax_amount: Option<f64>,
    pub extra_bed_charge: Option<f64>,
    /// Company billing reference; set when charges post to a corporate ledger
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
    /// Payment method recorded on the booking
    pub payment_method: Option<String>,
    /// Booking channel (walk-in, OTA, ...)
    pub source: Option<String>,
    /// Locked by a night-audit run
    pub is_posted: bool,
    pub posted_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Stay {
    /// Number of nights between check-in and check-out
    ///
    /// May be zero or negative for malformed input; callers validate.
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    pub fn is_company_billed(&self) -> bool {
        self.company_id.is_some()
    }
}

/// Computed final-bill breakdown
///
/// Derived fresh on every computation from Stay + settings + payments,
/// never persisted by desk-server. All amounts rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    /// Tax-exclusive room charge
    pub room_charge: f64,
    pub service_tax: f64,
    pub tourism_tax: f64,
    pub extra_bed_charge: f64,
    pub late_checkout_penalty: f64,
    pub subtotal: f64,
    /// Deposit required for this stay (0 when waived)
    pub deposit_required: f64,
    /// Deposit amount to be returned at checkout
    pub deposit_refund: f64,
    /// Amount the guest (or company) owes; deposit settles separately
    pub grand_total: f64,
}

/// Fields sent to the booking API when a checkout is confirmed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub stay_id: i64,
    pub grand_total: f64,
    /// Only present when a penalty was actually charged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_checkout_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_checkout_notes: Option<String>,
}
