//! Ticket purchase flow
//!
//! One [`CheckoutFlow`] drives a single purchase:
//!
//! ```text
//! Idle -> QuantitySelection -> AttendeeDetails -> PaymentIntentCreated
//!      -> StripeConfirmed -> Success
//! ```
//!
//! Every transition is an explicit call. A failed transition records an
//! error message and leaves the flow on its current step.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error_text;
use crate::config::PricingConfig;
use crate::models::{
    AttendeeInfo, ConfirmPurchaseRequest, Event, PaymentIntentRequest, PaymentIntentResponse, PriceBreakdown,
    PricingRules, TicketOrder, User,
};
use crate::services::{PaymentMethodInput, StripeClient, TicketService};
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::helpers::is_valid_email;
use crate::utils::logging::log_checkout_transition;

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStep {
    Idle,
    QuantitySelection,
    AttendeeDetails,
    PaymentIntentCreated { intent: PaymentIntentResponse },
    StripeConfirmed { payment_intent_id: String },
    Success { order: TicketOrder },
}

impl CheckoutStep {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStep::Idle => "idle",
            CheckoutStep::QuantitySelection => "quantity_selection",
            CheckoutStep::AttendeeDetails => "attendee_details",
            CheckoutStep::PaymentIntentCreated { .. } => "payment_intent_created",
            CheckoutStep::StripeConfirmed { .. } => "stripe_confirmed",
            CheckoutStep::Success { .. } => "success",
        }
    }
}

/// State of one ticket purchase
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    event: Event,
    rules: PricingRules,
    max_per_order: u32,
    quantity: u32,
    attendees: Vec<AttendeeInfo>,
    step: CheckoutStep,
    error: Option<String>,
}

impl CheckoutFlow {
    pub fn new(event: Event, pricing: &PricingConfig) -> Self {
        Self {
            event,
            rules: PricingRules::from(pricing),
            max_per_order: pricing.max_tickets_per_order,
            quantity: 1,
            attendees: vec![AttendeeInfo::default()],
            step: CheckoutStep::Idle,
            error: None,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn attendees(&self) -> &[AttendeeInfo] {
        &self.attendees
    }

    pub fn payment_intent(&self) -> Option<&PaymentIntentResponse> {
        match &self.step {
            CheckoutStep::PaymentIntentCreated { intent } => Some(intent),
            _ => None,
        }
    }

    /// Completed order, once the backend has confirmed the purchase
    pub fn order(&self) -> Option<&TicketOrder> {
        match &self.step {
            CheckoutStep::Success { order } => Some(order),
            _ => None,
        }
    }

    /// Largest quantity that can be ordered right now
    pub fn max_quantity(&self) -> u32 {
        self.max_per_order.min(self.event.remaining_capacity())
    }

    /// Estimated price split for the current quantity
    pub fn breakdown(&self) -> PriceBreakdown {
        self.rules.breakdown(self.event.price, self.quantity)
    }

    /// Open the quantity selection for an event that is on sale
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.expect_step(&[StepKind::Idle], "quantity_selection")?;

        if !self.event.is_on_sale(now) {
            return self.fail(TicketflowError::InvalidInput(format!(
                "Tickets for {} are not on sale",
                self.event.title
            )));
        }

        self.transition(CheckoutStep::QuantitySelection);
        Ok(())
    }

    /// Change the ticket count; attendees still in range keep their data
    pub fn set_quantity(&mut self, quantity: u32) -> Result<()> {
        self.expect_step(&[StepKind::QuantitySelection, StepKind::AttendeeDetails], "quantity_selection")?;

        let max = self.max_quantity();
        if quantity == 0 || quantity > max {
            return self.fail(TicketflowError::InvalidInput(format!(
                "Please choose between 1 and {} tickets",
                max
            )));
        }

        self.quantity = quantity;
        self.attendees.resize(quantity as usize, AttendeeInfo::default());
        self.error = None;
        debug!(event_id = %self.event.id, quantity = quantity, "Checkout quantity set");
        Ok(())
    }

    pub fn proceed_to_details(&mut self) -> Result<()> {
        self.expect_step(&[StepKind::QuantitySelection], "attendee_details")?;

        if self.quantity == 0 || self.quantity > self.max_quantity() {
            return self.fail(TicketflowError::InvalidInput(format!(
                "Please choose between 1 and {} tickets",
                self.max_quantity()
            )));
        }

        self.transition(CheckoutStep::AttendeeDetails);
        Ok(())
    }

    pub fn set_attendee(&mut self, index: usize, attendee: AttendeeInfo) -> Result<()> {
        self.expect_step(&[StepKind::AttendeeDetails], "attendee_details")?;

        if index >= self.attendees.len() {
            return self.fail(TicketflowError::InvalidInput(format!(
                "Attendee {} does not exist",
                index + 1
            )));
        }

        self.attendees[index] = attendee;
        Ok(())
    }

    /// Fill the first attendee with the signed-in user's details when still empty
    pub fn prefill_from_user(&mut self, user: &User) {
        if let Some(first) = self.attendees.first_mut() {
            if first.name.trim().is_empty() && first.email.trim().is_empty() {
                *first = AttendeeInfo::new(user.full_name(), user.email.clone());
            }
        }
    }

    /// Ask the backend for a PaymentIntent covering the order
    pub async fn create_payment_intent(&mut self, tickets: &TicketService) -> Result<()> {
        self.expect_step(&[StepKind::AttendeeDetails], "payment_intent_created")?;

        if let Some(position) = self.attendees.iter().position(|a| !attendee_is_complete(a)) {
            return self.fail(TicketflowError::InvalidInput(format!(
                "Please enter a name and a valid email for attendee {}",
                position + 1
            )));
        }

        let request = PaymentIntentRequest {
            event_id: self.event.id.clone(),
            quantity: self.quantity,
            attendees: self.attendees.clone(),
        };

        match tickets.create_payment_intent(&request).await {
            Ok(intent) => {
                self.transition(CheckoutStep::PaymentIntentCreated { intent });
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Confirm the card payment with Stripe. Stripe's message is kept verbatim on failure.
    pub async fn confirm_card_payment(
        &mut self,
        stripe: &StripeClient,
        payment_method: &PaymentMethodInput,
    ) -> Result<()> {
        let client_secret = match self.payment_intent() {
            Some(intent) => intent.client_secret.clone(),
            None => return self.reject("stripe_confirmed"),
        };

        match stripe.confirm_card_payment(&client_secret, payment_method).await {
            Ok(intent) => {
                self.transition(CheckoutStep::StripeConfirmed { payment_intent_id: intent.id });
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Record the paid purchase with the backend
    pub async fn confirm_purchase(&mut self, tickets: &TicketService) -> Result<TicketOrder> {
        let payment_intent_id = match &self.step {
            CheckoutStep::StripeConfirmed { payment_intent_id } => payment_intent_id.clone(),
            _ => return self.reject("success"),
        };

        let request = ConfirmPurchaseRequest {
            payment_intent_id,
            event_id: self.event.id.clone(),
            quantity: self.quantity,
            ticket_details: self.attendees.clone(),
        };

        match tickets.confirm_purchase(&request).await {
            Ok(order) => {
                self.transition(CheckoutStep::Success { order: order.clone() });
                Ok(order)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Step back one screen. Payments already confirmed with Stripe cannot be undone here.
    pub fn back(&mut self) -> Result<()> {
        let previous = match &self.step {
            CheckoutStep::QuantitySelection => CheckoutStep::Idle,
            CheckoutStep::AttendeeDetails => CheckoutStep::QuantitySelection,
            CheckoutStep::PaymentIntentCreated { .. } => CheckoutStep::AttendeeDetails,
            CheckoutStep::Idle | CheckoutStep::StripeConfirmed { .. } | CheckoutStep::Success { .. } => {
                return self.reject("back");
            }
        };

        self.transition(previous);
        Ok(())
    }

    /// Start over with one empty attendee
    pub fn reset(&mut self) {
        let from = self.step.name();
        self.quantity = 1;
        self.attendees = vec![AttendeeInfo::default()];
        self.error = None;
        self.step = CheckoutStep::Idle;
        log_checkout_transition(&self.event.id, from, self.step.name());
    }

    fn transition(&mut self, next: CheckoutStep) {
        log_checkout_transition(&self.event.id, self.step.name(), next.name());
        self.step = next;
        self.error = None;
    }

    fn expect_step(&mut self, allowed: &[StepKind], to: &str) -> Result<()> {
        if allowed.contains(&StepKind::of(&self.step)) {
            Ok(())
        } else {
            self.reject(to)
        }
    }

    /// Refuse a transition to `to`, recording it like any other failure. The step is unchanged.
    fn reject<T>(&mut self, to: &str) -> Result<T> {
        let error = TicketflowError::InvalidStateTransition {
            from: self.step.name().to_string(),
            to: to.to_string(),
        };
        self.fail(error)
    }

    fn fail<T>(&mut self, error: TicketflowError) -> Result<T> {
        // A cancelled request leaves the flow exactly as it was
        if !matches!(error, TicketflowError::Cancelled) {
            warn!(event_id = %self.event.id, step = self.step.name(), error = %error, "Checkout step failed");
            self.error = Some(error_text(&error));
        }
        Err(error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    Idle,
    QuantitySelection,
    AttendeeDetails,
    PaymentIntentCreated,
    StripeConfirmed,
    Success,
}

impl StepKind {
    fn of(step: &CheckoutStep) -> Self {
        match step {
            CheckoutStep::Idle => StepKind::Idle,
            CheckoutStep::QuantitySelection => StepKind::QuantitySelection,
            CheckoutStep::AttendeeDetails => StepKind::AttendeeDetails,
            CheckoutStep::PaymentIntentCreated { .. } => StepKind::PaymentIntentCreated,
            CheckoutStep::StripeConfirmed { .. } => StepKind::StripeConfirmed,
            CheckoutStep::Success { .. } => StepKind::Success,
        }
    }
}

fn attendee_is_complete(attendee: &AttendeeInfo) -> bool {
    !attendee.name.trim().is_empty() && is_valid_email(&attendee.email)
}
