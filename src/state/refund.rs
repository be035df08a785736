//! Refund selection for ticket orders
//!
//! A ticket can be picked for a refund only while its order is paid, the
//! ticket has no refund in progress and the event has not ended. The
//! backend re-checks all of this.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error_text;
use crate::models::{PricingRules, RefundRequest, RefundStatus, TicketOrder};
use crate::services::TicketService;
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::helpers::normalize_whitespace;
use crate::utils::logging::log_refund_request;

/// Whether any ticket of `order` may still be refunded
pub fn can_refund(order: &TicketOrder, now: DateTime<Utc>) -> bool {
    order.is_paid() && order.event.end_date > now
}

/// Whether the ticket at `index` may be selected for a refund
pub fn can_refund_detail(order: &TicketOrder, index: usize, now: DateTime<Utc>) -> bool {
    can_refund(order, now)
        && order
            .ticket_details
            .get(index)
            .is_some_and(|detail| detail.refund_status == RefundStatus::None)
}

/// Tickets selected for a refund on one order, plus the reason
#[derive(Debug, Clone)]
pub struct RefundSelection {
    order: TicketOrder,
    rules: PricingRules,
    selected: BTreeSet<usize>,
    reason: String,
    error: Option<String>,
}

impl RefundSelection {
    pub fn new(order: TicketOrder, rules: PricingRules) -> Self {
        Self {
            order,
            rules,
            selected: BTreeSet::new(),
            reason: String::new(),
            error: None,
        }
    }

    pub fn order(&self) -> &TicketOrder {
        &self.order
    }

    pub fn selected(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Select or deselect a ticket. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, index: usize, now: DateTime<Utc>) -> bool {
        if self.selected.remove(&index) {
            return false;
        }

        if can_refund_detail(&self.order, index, now) {
            self.selected.insert(index);
            true
        } else {
            debug!(order_id = %self.order.id, index = index, "Ticket is not refundable");
            false
        }
    }

    /// Select every refundable ticket
    pub fn select_all(&mut self, now: DateTime<Utc>) {
        self.selected = (0..self.order.ticket_details.len())
            .filter(|&index| can_refund_detail(&self.order, index, now))
            .collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn can_submit(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn estimated_refund(&self) -> Decimal {
        self.rules.calculate_refund_amount(&self.order, self.selected.len())
    }

    /// Ticket numbers for the current selection.
    ///
    /// Indices that no longer resolve to a ticket number are skipped; the
    /// second value is how many were skipped.
    pub fn ticket_numbers(&self) -> (Vec<String>, usize) {
        let mut numbers = Vec::with_capacity(self.selected.len());
        let mut dropped = 0;

        for &index in &self.selected {
            match self.order.ticket_number_at(index) {
                Some(number) => numbers.push(number.to_string()),
                None => {
                    warn!(order_id = %self.order.id, index = index, "Selected ticket has no ticket number, skipping");
                    dropped += 1;
                }
            }
        }

        (numbers, dropped)
    }

    /// Drop selected tickets that are no longer refundable at `now`.
    /// Returns how many were dropped.
    fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.selected.len();
        let order = &self.order;
        self.selected.retain(|&index| {
            let keep = can_refund_detail(order, index, now);
            if !keep {
                warn!(order_id = %order.id, index = index, "Selected ticket is no longer refundable, deselecting");
            }
            keep
        });
        before - self.selected.len()
    }

    /// Send the refund request. On success the updated order replaces the
    /// local copy and the selection is cleared.
    pub async fn submit(&mut self, tickets: &TicketService, now: DateTime<Utc>) -> Result<&TicketOrder> {
        let reason = normalize_whitespace(&self.reason);
        if reason.is_empty() {
            return self.fail(TicketflowError::InvalidInput(
                "Please provide a reason for the refund".to_string(),
            ));
        }
        if !self.can_submit() {
            return self.fail(TicketflowError::InvalidInput(
                "Please select at least one ticket".to_string(),
            ));
        }

        let stale = self.prune(now);
        let (ticket_numbers, unresolved) = self.ticket_numbers();
        let dropped = stale + unresolved;
        if ticket_numbers.is_empty() {
            return self.fail(TicketflowError::InvalidInput(
                "None of the selected tickets can be refunded".to_string(),
            ));
        }

        let count = ticket_numbers.len();
        let request = RefundRequest { ticket_numbers, reason };

        match tickets.request_ticket_refund(&self.order.id, &request).await {
            Ok(order) => {
                log_refund_request(&self.order.id, count, dropped);
                self.order = order;
                self.selected.clear();
                self.reason.clear();
                self.error = None;
                Ok(&self.order)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&mut self, error: TicketflowError) -> Result<T> {
        if !matches!(error, TicketflowError::Cancelled) {
            self.error = Some(error_text(&error));
        }
        Err(error)
    }
}

/// Per-order refund selections of the tickets dashboard
#[derive(Debug, Clone, Default)]
pub struct RefundDashboard {
    rules: PricingRules,
    selections: HashMap<String, RefundSelection>,
}

impl RefundDashboard {
    pub fn new(rules: PricingRules) -> Self {
        Self {
            rules,
            selections: HashMap::new(),
        }
    }

    /// Replace the known orders. Selections of orders that are still present
    /// are kept, minus tickets that stopped being refundable.
    pub fn load_orders(&mut self, orders: Vec<TicketOrder>, now: DateTime<Utc>) {
        let mut previous = std::mem::take(&mut self.selections);
        for order in orders {
            let selection = match previous.remove(&order.id) {
                Some(mut existing) => {
                    existing.order = order;
                    existing.prune(now);
                    existing
                }
                None => RefundSelection::new(order, self.rules.clone()),
            };
            self.selections.insert(selection.order.id.clone(), selection);
        }
    }

    pub fn selection(&self, order_id: &str) -> Option<&RefundSelection> {
        self.selections.get(order_id)
    }

    pub fn selection_mut(&mut self, order_id: &str) -> Result<&mut RefundSelection> {
        self.selections.get_mut(order_id).ok_or_else(|| TicketflowError::NotFound {
            resource: "Ticket order",
            id: order_id.to_string(),
        })
    }

    /// Orders that still have at least one refundable ticket
    pub fn refundable_orders(&self, now: DateTime<Utc>) -> Vec<&TicketOrder> {
        let mut orders: Vec<&TicketOrder> = self
            .selections
            .values()
            .map(RefundSelection::order)
            .filter(|order| (0..order.ticket_details.len()).any(|index| can_refund_detail(order, index, now)))
            .collect();
        orders.sort_by(|a, b| a.event.start_date.cmp(&b.event.start_date));
        orders
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventSummary, PaymentStatus, TicketDetail};
    use chrono::Duration;

    fn detail(number: &str, refund_status: RefundStatus) -> TicketDetail {
        TicketDetail {
            name: "Anna Muster".to_string(),
            email: "anna@example.ch".to_string(),
            ticket_number: number.to_string(),
            refund_status,
            checked_in: false,
        }
    }

    fn order(end_in: Duration, status: PaymentStatus, details: Vec<TicketDetail>) -> TicketOrder {
        let end = Utc::now() + end_in;
        TicketOrder {
            id: "ord-1".to_string(),
            event: EventSummary {
                id: "evt-1".to_string(),
                title: "Balboa Weekend".to_string(),
                start_date: end - Duration::hours(6),
                end_date: end,
                location: "Bern".to_string(),
                price: Decimal::new(2000, 2),
            },
            user_id: "user-1".to_string(),
            quantity: details.len() as u32,
            total_price: Decimal::new(2000, 2) * Decimal::from(details.len() as u64),
            payment_status: status,
            payment_intent_id: Some("pi_1".to_string()),
            ticket_details: details,
            purchase_date: Utc::now() - Duration::days(3),
        }
    }

    fn three_tickets() -> TicketOrder {
        order(
            Duration::days(5),
            PaymentStatus::Paid,
            vec![
                detail("T-1", RefundStatus::None),
                detail("T-2", RefundStatus::Requested),
                detail("T-3", RefundStatus::None),
            ],
        )
    }

    #[test]
    fn test_can_refund() {
        let now = Utc::now();
        assert!(can_refund(&three_tickets(), now));

        let past = order(Duration::hours(-1), PaymentStatus::Paid, vec![detail("T-1", RefundStatus::None)]);
        assert!(!can_refund(&past, now));

        let pending = order(Duration::days(5), PaymentStatus::Pending, vec![detail("T-1", RefundStatus::None)]);
        assert!(!can_refund(&pending, now));

        assert!(can_refund_detail(&three_tickets(), 0, now));
        assert!(!can_refund_detail(&three_tickets(), 1, now));
        assert!(!can_refund_detail(&three_tickets(), 7, now));
    }

    #[test]
    fn test_toggle_and_can_submit() {
        let now = Utc::now();
        let mut selection = RefundSelection::new(three_tickets(), PricingRules::default());
        assert!(!selection.can_submit());

        assert!(selection.toggle(0, now));
        assert!(selection.can_submit());
        // Refund already requested
        assert!(!selection.toggle(1, now));
        assert_eq!(selection.selected(), vec![0]);

        assert!(!selection.toggle(0, now));
        assert!(!selection.can_submit());
    }

    #[test]
    fn test_select_all_and_estimate() {
        let now = Utc::now();
        let mut selection = RefundSelection::new(three_tickets(), PricingRules::default());
        selection.select_all(now);
        assert_eq!(selection.selected(), vec![0, 2]);
        // 2 x 20.00 - 2 x 2.50
        assert_eq!(selection.estimated_refund(), Decimal::new(3500, 2));

        selection.clear();
        assert_eq!(selection.estimated_refund(), Decimal::ZERO);
    }

    #[test]
    fn test_ticket_numbers_skip_blank_numbers() {
        let now = Utc::now();
        let mut selection = RefundSelection::new(
            order(
                Duration::days(5),
                PaymentStatus::Paid,
                vec![detail("T-1", RefundStatus::None), detail("  ", RefundStatus::None)],
            ),
            PricingRules::default(),
        );
        selection.select_all(now);

        let (numbers, dropped) = selection.ticket_numbers();
        assert_eq!(numbers, vec!["T-1".to_string()]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_dashboard_keeps_selection_across_reload() {
        let now = Utc::now();
        let mut dashboard = RefundDashboard::new(PricingRules::default());
        dashboard.load_orders(vec![three_tickets()], now);
        dashboard.selection_mut("ord-1").unwrap().toggle(2, now);

        let mut shorter = three_tickets();
        shorter.ticket_details.truncate(2);
        dashboard.load_orders(vec![shorter], now);

        assert!(dashboard.selection("ord-1").unwrap().selected().is_empty());
        assert_eq!(dashboard.refundable_orders(now).len(), 1);
        assert!(dashboard.selection_mut("missing").is_err());
    }

    #[test]
    fn test_reload_deselects_tickets_no_longer_refundable() {
        let now = Utc::now();
        let mut dashboard = RefundDashboard::new(PricingRules::default());
        dashboard.load_orders(vec![three_tickets()], now);
        dashboard.selection_mut("ord-1").unwrap().select_all(now);
        assert_eq!(dashboard.selection("ord-1").unwrap().selected(), vec![0, 2]);

        let mut reloaded = three_tickets();
        reloaded.ticket_details[0].refund_status = RefundStatus::Requested;
        dashboard.load_orders(vec![reloaded], now);

        let selection = dashboard.selection("ord-1").unwrap();
        assert_eq!(selection.selected(), vec![2]);
        // 1 x 20.00 - 2.50
        assert_eq!(selection.estimated_refund(), Decimal::new(1750, 2));

        let mut ended = three_tickets();
        ended.event.end_date = now - Duration::minutes(5);
        dashboard.load_orders(vec![ended], now);

        let selection = dashboard.selection("ord-1").unwrap();
        assert!(selection.selected().is_empty());
        assert!(!selection.can_submit());
    }
}
