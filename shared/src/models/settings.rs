//! Hotel Settings Model (酒店参数)

use serde::{Deserialize, Serialize};

/// Hotel-wide billing parameters
///
/// Fetched from the settings provider; these are business configuration,
/// not process configuration, and may change between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSettings {
    /// Service tax percentage already contained in nightly rates (e.g. 6.0)
    pub service_tax_rate: f64,
    /// Tourism tax per night, charged to foreign guests only
    pub tourism_tax_rate: f64,
    /// Refundable room-card deposit collected at check-in
    pub room_card_deposit: f64,
    /// Checkout cutoff, "HH:MM" 24h local time
    pub check_out_time: String,
}

impl Default for HotelSettings {
    fn default() -> Self {
        Self {
            service_tax_rate: 6.0,
            tourism_tax_rate: 10.0,
            room_card_deposit: 50.0,
            check_out_time: "12:00".to_string(),
        }
    }
}
