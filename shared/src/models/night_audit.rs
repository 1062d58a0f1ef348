//! Night Audit Models (夜审)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Revenue aggregated by a category key (payment method, booking channel)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueBreakdownItem {
    pub category: String,
    pub count: i64,
    pub amount: f64,
}

/// Room-status counts at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatusSnapshot {
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
    pub reserved: i64,
    pub maintenance: i64,
    pub dirty: i64,
}

/// Night audit run - immutable end-of-day posting record
///
/// Keyed by a unique `audit_date`; once a run exists for a date no further
/// run may post against it. There is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditRun {
    pub id: i64,
    pub audit_date: NaiveDate,
    pub run_at: DateTime<Utc>,
    pub run_by: Option<String>,
    pub total_bookings_posted: i64,
    pub total_checkins: i64,
    pub total_checkouts: i64,
    pub total_revenue: f64,
    /// occupied / total rooms × 100, from the snapshot at run time
    pub occupancy_rate: f64,
    pub rooms: RoomStatusSnapshot,
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method_breakdown: Vec<RevenueBreakdownItem>,
    #[serde(default)]
    pub channel_breakdown: Vec<RevenueBreakdownItem>,
}

/// Draft run assembled by the poster, persisted by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditRunDraft {
    pub audit_date: NaiveDate,
    pub run_by: Option<String>,
    pub total_bookings_posted: i64,
    pub total_checkins: i64,
    pub total_checkouts: i64,
    pub total_revenue: f64,
    pub occupancy_rate: f64,
    pub rooms: RoomStatusSnapshot,
    pub notes: Option<String>,
    pub payment_method_breakdown: Vec<RevenueBreakdownItem>,
    pub channel_breakdown: Vec<RevenueBreakdownItem>,
}

/// Stay not yet locked by an audit run, as listed in the preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnpostedStay {
    pub stay_id: i64,
    pub stay_number: String,
    pub guest_name: String,
    pub room_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: String,
    pub total_amount: f64,
    pub payment_method: Option<String>,
    pub source: Option<String>,
}

/// Read-only preview of what a run for `audit_date` would post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditPreview {
    pub audit_date: NaiveDate,
    pub can_run: bool,
    pub already_run: bool,
    pub unposted: Vec<UnpostedStay>,
    pub total_unposted: i64,
    pub estimated_revenue: f64,
    pub rooms: RoomStatusSnapshot,
    pub payment_method_breakdown: Vec<RevenueBreakdownItem>,
    pub channel_breakdown: Vec<RevenueBreakdownItem>,
}

/// Posted stay line for reporting/export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedStayDetail {
    pub stay_id: i64,
    pub stay_number: String,
    pub guest_name: String,
    pub room_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub status: String,
    pub total_amount: f64,
    pub payment_method: Option<String>,
    pub source: Option<String>,
}

/// Full run detail including the stays it locked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAuditDetail {
    pub run: NightAuditRun,
    pub posted_stays: Vec<PostedStayDetail>,
}
