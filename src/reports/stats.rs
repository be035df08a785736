//! Dashboard metrics

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{DashboardStats, EventSales, Participant, PricingRules, RefundStatus};
use crate::utils::helpers::percentage;

/// Derived figures for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub event_id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub capacity: u32,
    pub tickets_sold: u32,
    /// Sold share of capacity, in percent
    pub fill_rate: f64,
    pub gross_revenue: Decimal,
    pub platform_fee: Decimal,
    pub organizer_payout: Decimal,
    /// Refunded share of sold tickets, in percent
    pub refund_rate: f64,
    /// Checked-in share of sold tickets, in percent
    pub check_in_rate: f64,
}

pub fn event_metrics(sales: &EventSales, rules: &PricingRules) -> EventMetrics {
    let sold = u64::from(sales.tickets_sold);

    EventMetrics {
        event_id: sales.event_id.clone(),
        title: sales.title.clone(),
        start_date: sales.start_date,
        capacity: sales.capacity,
        tickets_sold: sales.tickets_sold,
        fill_rate: percentage(sold, u64::from(sales.capacity)),
        gross_revenue: sales.revenue,
        platform_fee: rules.platform_fee(sales.revenue),
        organizer_payout: rules.organizer_payment(sales.revenue),
        refund_rate: percentage(u64::from(sales.tickets_refunded), sold),
        check_in_rate: percentage(u64::from(sales.checked_in), sold),
    }
}

/// Metrics per event, highest revenue first
pub fn summaries_by_revenue(sales: &[EventSales], rules: &PricingRules) -> Vec<EventMetrics> {
    let mut metrics: Vec<EventMetrics> = sales.iter().map(|s| event_metrics(s, rules)).collect();
    metrics.sort_by(|a, b| {
        b.gross_revenue
            .cmp(&a.gross_revenue)
            .then_with(|| a.title.cmp(&b.title))
    });
    metrics
}

/// Organizer dashboard totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_events: u32,
    pub active_events: u32,
    pub total_tickets_sold: u64,
    pub gross_revenue: Decimal,
    pub platform_fee: Decimal,
    pub organizer_payout: Decimal,
    /// Mean fill rate over events with a capacity
    pub average_fill_rate: f64,
    pub pending_refunds: u32,
    pub events: Vec<EventMetrics>,
}

pub fn summarize_dashboard(stats: &DashboardStats, rules: &PricingRules) -> DashboardSummary {
    let events = summaries_by_revenue(&stats.events, rules);

    let with_capacity: Vec<f64> = events
        .iter()
        .filter(|metrics| metrics.capacity > 0)
        .map(|metrics| metrics.fill_rate)
        .collect();
    let average_fill_rate = if with_capacity.is_empty() {
        0.0
    } else {
        with_capacity.iter().sum::<f64>() / with_capacity.len() as f64
    };

    DashboardSummary {
        total_events: stats.total_events,
        active_events: stats.active_events,
        total_tickets_sold: stats.total_tickets_sold,
        gross_revenue: stats.total_revenue,
        platform_fee: rules.platform_fee(stats.total_revenue),
        organizer_payout: rules.organizer_payment(stats.total_revenue),
        average_fill_rate,
        pending_refunds: stats.pending_refunds,
        events,
    }
}

/// Attendance figures from a participant list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStats {
    pub total: usize,
    pub checked_in: usize,
    pub refund_pending: usize,
    pub refunded: usize,
}

impl ParticipantStats {
    pub fn from_participants(participants: &[Participant]) -> Self {
        participants.iter().fold(Self::default(), |mut stats, participant| {
            stats.total += 1;
            if participant.checked_in {
                stats.checked_in += 1;
            }
            match participant.refund_status {
                RefundStatus::Requested | RefundStatus::Approved => stats.refund_pending += 1,
                RefundStatus::Refunded => stats.refunded += 1,
                RefundStatus::None | RefundStatus::Rejected => {}
            }
            stats
        })
    }

    /// Checked-in share of participants still holding a ticket, in percent
    pub fn check_in_rate(&self) -> f64 {
        percentage(self.checked_in as u64, (self.total - self.refunded) as u64)
    }
}
