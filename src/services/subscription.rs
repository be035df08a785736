//! Subscription service implementation
//!
//! Organizer billing plans. Stripe is only reached through the backend proxy.

use reqwest::Method;
use tracing::info;

use super::http::ApiClient;
use crate::models::{Plan, Subscription, SubscriptionCheckout, SubscriptionCheckoutRequest};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct SubscriptionService {
    api: ApiClient,
}

impl SubscriptionService {
    /// Create a new SubscriptionService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_plans(&self) -> Result<Vec<Plan>> {
        self.api.get("/subscriptions/plans").await
    }

    /// Current subscription, `None` when the user has never subscribed
    pub async fn get_current_subscription(&self) -> Result<Option<Subscription>> {
        self.api.get_optional("/subscriptions/current").await
    }

    pub async fn create_checkout(&self, plan_id: &str) -> Result<SubscriptionCheckout> {
        let request = SubscriptionCheckoutRequest { plan_id: plan_id.to_string() };
        self.api.post("/subscriptions/checkout", &request).await
    }

    pub async fn cancel_subscription(&self) -> Result<()> {
        self.api.send_unit::<()>(Method::POST, "/subscriptions/cancel", None).await?;
        info!("Subscription cancellation requested");
        Ok(())
    }

    /// Have the backend re-read the subscription from Stripe
    pub async fn sync_subscription(&self) -> Result<Option<Subscription>> {
        self.api.post_optional("/subscriptions/sync", &serde_json::json!({})).await
    }
}
