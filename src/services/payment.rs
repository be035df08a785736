//! Stripe card payment confirmation
//!
//! Confirms a backend-created PaymentIntent with the publishable key and the
//! intent's client secret, the same call Stripe.js makes from a browser. The
//! secret key never leaves the backend.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StripeConfig;
use crate::utils::errors::{Result, StripeError, StripeResult, TicketflowError};

/// How the card is supplied to Stripe
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentMethodInput {
    /// A PaymentMethod already created by Stripe Elements (`pm_...`)
    Existing(String),
    /// A card token (`tok_...`) plus optional billing details
    CardToken {
        token: String,
        billing_details: Option<BillingDetails>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl PaymentIntentStatus {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentIntentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentIntentStatus::RequiresAction => "requires_action",
            PaymentIntentStatus::Processing => "processing",
            PaymentIntentStatus::RequiresCapture => "requires_capture",
            PaymentIntentStatus::Canceled => "canceled",
            PaymentIntentStatus::Succeeded => "succeeded",
        }
    }
}

/// The subset of a Stripe PaymentIntent the checkout needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub last_payment_error: Option<StripeApiError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
}

impl From<StripeApiError> for StripeError {
    fn from(error: StripeApiError) -> Self {
        StripeError::Card {
            message: error
                .message
                .unwrap_or_else(|| "Your payment could not be processed.".to_string()),
            code: error.code,
            decline_code: error.decline_code,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeApiError,
}

/// Stripe client limited to publishable-key operations
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_url: String,
    publishable_key: String,
    cancel: Option<CancellationToken>,
}

impl StripeClient {
    /// Create a new StripeClient instance
    pub fn new(config: &StripeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            publishable_key: config.publishable_key.clone(),
            cancel: None,
        })
    }

    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self.clone()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.publishable_key.is_empty()
    }

    /// Confirm a card payment for the PaymentIntent behind `client_secret`.
    ///
    /// Succeeds only once the intent is `succeeded` or `processing`; any
    /// decline is returned with Stripe's own message.
    pub async fn confirm_card_payment(
        &self,
        client_secret: &str,
        payment_method: &PaymentMethodInput,
    ) -> Result<StripePaymentIntent> {
        if !self.is_configured() {
            return Err(TicketflowError::Config(
                "Stripe publishable key is not configured".to_string(),
            ));
        }

        let intent_id = payment_intent_id_from_secret(client_secret)?;
        let url = format!("{}/v1/payment_intents/{}/confirm", self.api_url, intent_id);
        let form = confirm_form(client_secret, payment_method);

        debug!(payment_intent_id = %intent_id, "Confirming card payment with Stripe");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.publishable_key)
            .form(&form);

        let fut = async {
            let response = request.send().await.map_err(|e| {
                TicketflowError::Stripe(StripeError::RequestFailed(e.to_string()))
            })?;
            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                let error = serde_json::from_str::<StripeErrorEnvelope>(&body)
                    .map(|envelope| StripeError::from(envelope.error))
                    .unwrap_or_else(|_| StripeError::RequestFailed(format!("HTTP {}", status)));
                return Err(TicketflowError::Stripe(error));
            }

            let intent: StripePaymentIntent = serde_json::from_str(&body)
                .map_err(|e| TicketflowError::Stripe(StripeError::InvalidResponse(e.to_string())))?;
            Ok::<_, TicketflowError>(intent)
        };

        let intent = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TicketflowError::Cancelled),
                    result = fut => result,
                }
            }
            None => fut.await,
        }?;

        check_intent(intent).map_err(|e| {
            warn!(payment_intent_id = %intent_id, error = %e, "Card payment not completed");
            TicketflowError::Stripe(e)
        })
    }
}

fn check_intent(intent: StripePaymentIntent) -> StripeResult<StripePaymentIntent> {
    match intent.status {
        PaymentIntentStatus::Succeeded | PaymentIntentStatus::Processing => {
            info!(payment_intent_id = %intent.id, status = intent.status.as_str(), "Card payment confirmed");
            Ok(intent)
        }
        PaymentIntentStatus::RequiresPaymentMethod => Err(intent
            .last_payment_error
            .map(StripeError::from)
            .unwrap_or_else(|| StripeError::Card {
                message: "Your card was declined.".to_string(),
                code: None,
                decline_code: None,
            })),
        status => Err(StripeError::RequiresAction {
            status: status.as_str().to_string(),
        }),
    }
}

/// `pi_123_secret_abc` -> `pi_123`
pub fn payment_intent_id_from_secret(client_secret: &str) -> StripeResult<&str> {
    match client_secret.split_once("_secret_") {
        Some((id, secret)) if id.starts_with("pi_") && !secret.is_empty() => Ok(id),
        _ => Err(StripeError::InvalidClientSecret),
    }
}

fn confirm_form(client_secret: &str, payment_method: &PaymentMethodInput) -> Vec<(String, String)> {
    let mut form = vec![("client_secret".to_string(), client_secret.to_string())];

    match payment_method {
        PaymentMethodInput::Existing(id) => {
            form.push(("payment_method".to_string(), id.clone()));
        }
        PaymentMethodInput::CardToken { token, billing_details } => {
            form.push(("payment_method_data[type]".to_string(), "card".to_string()));
            form.push(("payment_method_data[card][token]".to_string(), token.clone()));
            if let Some(details) = billing_details {
                if let Some(name) = &details.name {
                    form.push(("payment_method_data[billing_details][name]".to_string(), name.clone()));
                }
                if let Some(email) = &details.email {
                    form.push(("payment_method_data[billing_details][email]".to_string(), email.clone()));
                }
            }
        }
    }

    form
}
