//! Client state management
//!
//! The signed-in session, its persistence, and the checkout and refund flows.

pub mod checkout;
pub mod refund;
pub mod session;
pub mod storage;

pub use checkout::{CheckoutFlow, CheckoutStep};
pub use refund::{can_refund, can_refund_detail, RefundDashboard, RefundSelection};
pub use session::{Session, SessionState};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

use crate::utils::errors::TicketflowError;

/// Message a flow keeps for display after a failed step
fn error_text(error: &TicketflowError) -> String {
    match error {
        TicketflowError::InvalidInput(message) | TicketflowError::Authentication(message) => message.clone(),
        TicketflowError::Api { message, .. } if !message.is_empty() => message.clone(),
        TicketflowError::Stripe(e) => e.to_string(),
        other => other.to_string(),
    }
}
