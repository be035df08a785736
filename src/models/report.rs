//! Organizer dashboard and report models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ticket::RefundStatus;

/// Totals across all of an organizer's events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_events: u32,
    pub active_events: u32,
    pub total_tickets_sold: u64,
    pub total_revenue: Decimal,
    #[serde(default)]
    pub pending_refunds: u32,
    #[serde(default)]
    pub events: Vec<EventSales>,
}

/// Sales figures for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSales {
    pub event_id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub capacity: u32,
    pub tickets_sold: u32,
    pub revenue: Decimal,
    #[serde(default)]
    pub tickets_refunded: u32,
    #[serde(default)]
    pub checked_in: u32,
}

/// Detailed report for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub sales: EventSales,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub daily_sales: Vec<DailySales>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: String,
    pub tickets: u32,
    pub revenue: Decimal,
}

/// One attendee as seen by the organizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub ticket_number: String,
    pub order_id: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub checked_in: bool,
    #[serde(default)]
    pub refund_status: RefundStatus,
}

/// Entry of the organizer's refund queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequestSummary {
    pub id: String,
    pub order_id: String,
    pub event_id: String,
    pub event_title: String,
    pub requester_email: String,
    pub ticket_numbers: Vec<String>,
    pub reason: String,
    pub amount: Decimal,
    pub status: RefundStatus,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
