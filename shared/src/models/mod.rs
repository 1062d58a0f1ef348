//! Data models
//!
//! Shared between desk-server and the admin dashboard (via API).
//! All IDs are `i64`, issued by the remote hotel API.
//! Monetary fields are `f64`, rounded to 2 decimal places at computation
//! boundaries (see desk-server `billing::money`).

pub mod company;
pub mod night_audit;
pub mod payment;
pub mod room;
pub mod settings;
pub mod stay;

// Re-exports
pub use company::*;
pub use night_audit::*;
pub use payment::*;
pub use room::*;
pub use settings::*;
pub use stay::*;
