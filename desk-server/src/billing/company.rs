//! Company ledger posting
//!
//! For company-billed stays the reconciled charge is posted as a receivable
//! against the company instead of being collected from the guest. Exactly
//! one entry per checkout; the poster is only reachable from the terminal
//! Completed transition of the checkout flow, which is what enforces that.

use chrono::NaiveDate;

use shared::models::{ChargeBreakdown, CompanyLedgerEntry, CompanyLedgerEntryCreate, Stay};

use crate::billing::{BillingError, BillingResult};
use crate::providers::CompanyLedgerProvider;

pub struct CompanyLedgerPoster;

impl CompanyLedgerPoster {
    /// Post the reconciled charge for a company-billed stay
    ///
    /// Amount is the grand total (room charge, taxes and any penalty); the
    /// deposit never posts to the company ledger; it is waived for
    /// company-billed stays to begin with.
    pub async fn post(
        provider: &dyn CompanyLedgerProvider,
        stay: &Stay,
        breakdown: &ChargeBreakdown,
        posting_date: NaiveDate,
    ) -> BillingResult<CompanyLedgerEntry> {
        let company_id = stay.company_id.ok_or_else(|| {
            BillingError::InvalidOperation(format!("stay {} is not company-billed", stay.id))
        })?;

        let create = CompanyLedgerEntryCreate {
            company_id,
            stay_id: stay.id,
            description: format!(
                "Room {} {} to {} ({})",
                stay.room_number, stay.check_in_date, stay.check_out_date, stay.guest_name
            ),
            amount: breakdown.grand_total,
            posting_date,
            reference: Some(stay.stay_number.clone()),
        };

        tracing::info!(
            stay_id = stay.id,
            company_id,
            amount = breakdown.grand_total,
            "posting checkout to company ledger"
        );

        let entry = provider.create_entry(&create).await?;
        Ok(entry)
    }
}
