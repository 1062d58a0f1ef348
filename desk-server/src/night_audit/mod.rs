//! Night Audit Module
//!
//! The once-daily batch that finalizes a day's bookings: every eligible
//! unposted stay is locked, aggregates are computed, and a single immutable
//! [`shared::models::NightAuditRun`] is created for the date.
//!
//! The central invariant is at-most-one successful run per `audit_date`.
//! The client checks first, but the authoritative guard is the provider-side
//! uniqueness constraint, because two operators can submit simultaneously.

pub mod poster;

pub use poster::NightAuditPoster;

use chrono::NaiveDate;

use crate::providers::ProviderError;

/// Night audit errors
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("night audit already completed for {date}")]
    AlreadyRun { date: NaiveDate },

    #[error("invalid audit date: {0}")]
    InvalidDate(String),

    #[error("night audit for {date} aborted, postings rolled back: {reason}")]
    RunAborted { date: NaiveDate, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type AuditResult<T> = Result<T, AuditError>;
