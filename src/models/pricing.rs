//! Client-side price estimates
//!
//! These figures are for display only. The backend computes the amounts that
//! are actually charged, paid out and refunded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ticket::TicketOrder;
use crate::config::PricingConfig;
use crate::utils::helpers::round_money;

/// Fee and refund parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRules {
    pub currency: String,
    /// Share of the ticket price kept by the platform, in percent
    pub platform_fee_percent: Decimal,
    /// Flat fee withheld per refunded ticket
    pub cancellation_fee: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            currency: "CHF".to_string(),
            platform_fee_percent: Decimal::new(10, 0),
            cancellation_fee: Decimal::new(250, 2),
        }
    }
}

impl From<&PricingConfig> for PricingRules {
    fn from(config: &PricingConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            platform_fee_percent: config.platform_fee_percent,
            cancellation_fee: config.cancellation_fee,
        }
    }
}

/// Split of a purchase between platform and organizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub platform_fee: Decimal,
    pub organizer_payment: Decimal,
}

impl PricingRules {
    pub fn platform_fee(&self, amount: Decimal) -> Decimal {
        round_money(amount * self.platform_fee_percent / Decimal::ONE_HUNDRED)
    }

    /// Organizer share; always `amount - platform_fee(amount)` so the two add up
    pub fn organizer_payment(&self, amount: Decimal) -> Decimal {
        amount - self.platform_fee(amount)
    }

    pub fn breakdown(&self, unit_price: Decimal, quantity: u32) -> PriceBreakdown {
        let subtotal = unit_price * Decimal::from(quantity);
        PriceBreakdown {
            unit_price,
            quantity,
            subtotal,
            platform_fee: self.platform_fee(subtotal),
            organizer_payment: self.organizer_payment(subtotal),
        }
    }

    /// `max(0, n * price - n * cancellation_fee)`
    pub fn refund_amount(&self, price_per_ticket: Decimal, ticket_count: usize) -> Decimal {
        let n = Decimal::from(ticket_count as u64);
        let amount = n * price_per_ticket - n * self.cancellation_fee;
        round_money(amount.max(Decimal::ZERO))
    }

    /// Estimated refund for `ticket_count` tickets of `order`
    pub fn calculate_refund_amount(&self, order: &TicketOrder, ticket_count: usize) -> Decimal {
        self.refund_amount(order.price_per_ticket(), ticket_count)
    }
}
