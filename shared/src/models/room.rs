//! Room Model (客房)

use serde::{Deserialize, Serialize};

/// Room status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
    Dirty,
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomStatus::Available => write!(f, "available"),
            RoomStatus::Occupied => write!(f, "occupied"),
            RoomStatus::Reserved => write!(f, "reserved"),
            RoomStatus::Maintenance => write!(f, "maintenance"),
            RoomStatus::Dirty => write!(f, "dirty"),
        }
    }
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    /// Published nightly list price (tax-inclusive); fallback when a stay
    /// carries no rate
    pub list_price: f64,
    pub status: RoomStatus,
}
