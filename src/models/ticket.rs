//! Ticket order model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::event::EventSummary;

/// A purchase covering one or more tickets for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOrder {
    pub id: String,
    pub event: EventSummary,
    pub user_id: String,
    pub quantity: u32,
    pub total_price: Decimal,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub ticket_details: Vec<TicketDetail>,
    pub purchase_date: DateTime<Utc>,
}

impl TicketOrder {
    /// Price of a single ticket in this order
    pub fn price_per_ticket(&self) -> Decimal {
        if self.quantity == 0 {
            self.event.price
        } else {
            self.total_price / Decimal::from(self.quantity)
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Ticket detail at `index` carrying a usable ticket number
    pub fn ticket_number_at(&self, index: usize) -> Option<&str> {
        self.ticket_details
            .get(index)
            .map(|detail| detail.ticket_number.trim())
            .filter(|number| !number.is_empty())
    }

    pub fn refunded_count(&self) -> usize {
        self.ticket_details
            .iter()
            .filter(|detail| detail.refund_status != RefundStatus::None)
            .count()
    }
}

/// Per-attendee record within a ticket order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub ticket_number: String,
    #[serde(default)]
    pub refund_status: RefundStatus,
    #[serde(default)]
    pub checked_in: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    None,
    Requested,
    Approved,
    Rejected,
    Refunded,
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundStatus::None => write!(f, "none"),
            RefundStatus::Requested => write!(f, "requested"),
            RefundStatus::Approved => write!(f, "approved"),
            RefundStatus::Rejected => write!(f, "rejected"),
            RefundStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// Attendee data entered during checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeInfo {
    pub name: String,
    pub email: String,
}

impl AttendeeInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub event_id: String,
    pub quantity: u32,
    pub attendees: Vec<AttendeeInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPurchaseRequest {
    pub payment_intent_id: String,
    pub event_id: String,
    pub quantity: u32,
    pub ticket_details: Vec<AttendeeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub ticket_numbers: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
