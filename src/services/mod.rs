//! Services module
//!
//! Typed wrappers around the platform REST API and Stripe

pub mod auth;
pub mod event;
pub mod http;
pub mod organizer;
pub mod payment;
pub mod subscription;
pub mod ticket;

// Re-export commonly used services
pub use auth::AuthService;
pub use event::EventService;
pub use http::ApiClient;
pub use organizer::OrganizerService;
pub use payment::{BillingDetails, PaymentIntentStatus, PaymentMethodInput, StripeClient, StripePaymentIntent};
pub use subscription::SubscriptionService;
pub use ticket::TicketService;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::settings::Settings;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub api: ApiClient,
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub ticket_service: TicketService,
    pub organizer_service: OrganizerService,
    pub subscription_service: SubscriptionService,
    pub stripe: StripeClient,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings) -> Result<Self> {
        let api = ApiClient::new(&settings.api)?;
        let stripe = StripeClient::new(&settings.stripe)?;
        Ok(Self::from_clients(api, stripe))
    }

    fn from_clients(api: ApiClient, stripe: StripeClient) -> Self {
        Self {
            auth_service: AuthService::new(api.clone()),
            event_service: EventService::new(api.clone()),
            ticket_service: TicketService::new(api.clone()),
            organizer_service: OrganizerService::new(api.clone()),
            subscription_service: SubscriptionService::new(api.clone()),
            stripe,
            api,
        }
    }

    /// Services whose requests are all abandoned when `cancel` fires.
    ///
    /// Use one token per navigation; the bearer token stays shared.
    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self::from_clients(self.api.scoped(cancel.clone()), self.stripe.scoped(cancel))
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let api_reachable = match self.api.send_unit::<()>(Method::GET, "/health", None).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "API health check failed");
                false
            }
        };

        ServiceHealthStatus {
            api_reachable,
            stripe_configured: self.stripe.is_configured(),
            authenticated: self.api.has_token().await,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub api_reachable: bool,
    pub stripe_configured: bool,
    pub authenticated: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.api_reachable
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.api_reachable {
            issues.push("Platform API unreachable".to_string());
        }
        if !self.stripe_configured {
            issues.push("Stripe publishable key not configured; checkout disabled".to_string());
        }

        issues
    }
}
