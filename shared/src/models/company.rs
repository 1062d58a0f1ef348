//! Company Ledger Models (公司挂账)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Receivable posted against a company for a company-billed stay
///
/// Created once per checkout, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyLedgerEntry {
    pub id: i64,
    pub company_id: i64,
    pub stay_id: i64,
    pub description: String,
    pub amount: f64,
    pub posting_date: NaiveDate,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create ledger entry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyLedgerEntryCreate {
    pub company_id: i64,
    pub stay_id: i64,
    pub description: String,
    pub amount: f64,
    pub posting_date: NaiveDate,
    pub reference: Option<String>,
}
