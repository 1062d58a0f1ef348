//! Payment Model (收付款记录)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment status
///
/// A refund is a new record with status `Refunded`, never an edit of an
/// existing one; the payment history of a stay is append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    OnlineBanking,
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::OnlineBanking => write!(f, "online_banking"),
            PaymentMethod::Other => write!(f, "other"),
        }
    }
}

/// Payment record, append-only per stay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub stay_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Marks deposit collection/return records
    pub is_deposit: bool,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub stay_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub is_deposit: bool,
    pub reference: Option<String>,
    pub notes: Option<String>,
}
