//! Ticketflow client core
//!
//! Typed services for the ticketing platform API and Stripe, the signed-in
//! session, the checkout and refund flows, translations and organizer
//! reports. The flows are plain Rust types; a UI, a CLI or tests drive them.

pub mod config;
pub mod i18n;
pub mod models;
pub mod reports;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{Result, StripeError, TicketflowError};

// Re-export main components for easy access
pub use i18n::I18n;
pub use services::ServiceFactory;
pub use state::{CheckoutFlow, RefundDashboard, RefundSelection, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
