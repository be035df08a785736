//! Ticket service implementation
//!
//! Purchase (payment intent + backend confirmation), ticket listing, refund
//! requests and attendee edits.

use tracing::{debug, info};

use super::http::ApiClient;
use crate::models::{
    AttendeeUpdate, ConfirmPurchaseRequest, PaymentIntentRequest, PaymentIntentResponse, RefundRequest, TicketOrder,
};
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::helpers::generate_idempotency_key;

#[derive(Debug, Clone)]
pub struct TicketService {
    api: ApiClient,
}

impl TicketService {
    /// Create a new TicketService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_user_tickets(&self) -> Result<Vec<TicketOrder>> {
        self.api.get("/tickets/my-tickets").await
    }

    pub async fn get_ticket(&self, order_id: &str) -> Result<TicketOrder> {
        let path = format!("/tickets/{}", urlencoding::encode(order_id));
        match self.api.get(&path).await {
            Err(TicketflowError::Api { status: 404, .. }) => Err(TicketflowError::NotFound {
                resource: "Ticket order",
                id: order_id.to_string(),
            }),
            other => other,
        }
    }

    /// Ask the backend for a Stripe PaymentIntent covering the order
    pub async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResponse> {
        debug!(event_id = %request.event_id, quantity = request.quantity, "Creating payment intent");
        let headers = [("Idempotency-Key", generate_idempotency_key())];
        self.api
            .post_with_headers("/tickets/create-payment-intent", request, &headers)
            .await
    }

    /// Record a purchase whose payment Stripe has confirmed
    pub async fn confirm_purchase(&self, request: &ConfirmPurchaseRequest) -> Result<TicketOrder> {
        let order: TicketOrder = self.api.post("/tickets/confirm-purchase", request).await?;
        info!(order_id = %order.id, event_id = %request.event_id, quantity = order.quantity, "Purchase confirmed");
        Ok(order)
    }

    pub async fn request_ticket_refund(&self, order_id: &str, request: &RefundRequest) -> Result<TicketOrder> {
        let path = format!("/tickets/{}/refund", urlencoding::encode(order_id));
        self.api.post(&path, request).await
    }

    pub async fn update_attendee(&self, order_id: &str, ticket_number: &str, update: &AttendeeUpdate) -> Result<TicketOrder> {
        let path = format!(
            "/tickets/{}/attendees/{}",
            urlencoding::encode(order_id),
            urlencoding::encode(ticket_number)
        );
        self.api.put(&path, update).await
    }

    /// PDF ticket as produced by the backend
    pub async fn download_ticket_pdf(&self, order_id: &str) -> Result<Vec<u8>> {
        let path = format!("/tickets/{}/pdf", urlencoding::encode(order_id));
        self.api.get_bytes(&path).await
    }
}
