//! Authenticated session
//!
//! Holds the signed-in user, their subscription and the bearer token, and
//! keeps them in sync with [`SessionStorage`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::models::{AuthPayload, PlanTier, RegisterRequest, Subscription, UpdateProfileRequest, User};
use crate::services::{AuthService, ServiceFactory, SubscriptionService};
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::logging::log_user_action;

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub subscription: Option<Subscription>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Admins always pass; everyone else needs an active plan of at least `required`
    pub fn has_required_subscription(&self, required: PlanTier) -> bool {
        match &self.user {
            Some(user) if user.is_admin() => true,
            Some(_) => self
                .subscription
                .as_ref()
                .is_some_and(|subscription| subscription.grants(required)),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Shared session handle, usually wrapped in an `Arc`
#[derive(Debug)]
pub struct Session {
    auth: AuthService,
    subscriptions: SubscriptionService,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(services: &ServiceFactory, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            auth: services.auth_service.clone(),
            subscriptions: services.subscription_service.clone(),
            storage,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn subscription(&self) -> Option<Subscription> {
        self.state.read().await.subscription.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn has_required_subscription(&self, required: PlanTier) -> bool {
        self.state.read().await.has_required_subscription(required)
    }

    /// Restore a stored session.
    ///
    /// Returns the user when the stored token is still accepted by the
    /// backend. Any failure other than cancellation logs the session out.
    pub async fn initialize(&self) -> Result<Option<User>> {
        let Some(token) = self.storage.get(TOKEN_KEY).await? else {
            debug!("No stored session");
            return Ok(None);
        };

        if token_expired(&token, Utc::now()) {
            info!("Stored token has expired");
            self.logout().await?;
            return Ok(None);
        }

        self.auth.api().set_token(Some(token)).await;

        match self.restore().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                Ok(Some(user))
            }
            Err(TicketflowError::Cancelled) => {
                // Keep the stored session so the next attempt can restore it
                self.auth.api().set_token(None).await;
                Err(TicketflowError::Cancelled)
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed, logging out");
                self.logout().await?;
                Ok(None)
            }
        }
    }

    async fn restore(&self) -> Result<User> {
        self.auth.verify_token().await?;
        let (user, subscription) = futures::try_join!(
            self.auth.get_profile(),
            self.subscriptions.get_current_subscription()
        )?;

        self.storage.set(USER_KEY, &serde_json::to_string(&user)?).await?;
        *self.state.write().await = SessionState {
            user: Some(user.clone()),
            subscription,
        };
        Ok(user)
    }

    /// Sign in. On failure nothing is stored and the session stays signed out.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let payload = self.auth.login(email, password).await?;
        self.establish(payload, "login").await
    }

    /// Create an account and sign in, with the same contract as [`Session::login`]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let payload = self.auth.register(request).await?;
        self.establish(payload, "register").await
    }

    async fn establish(&self, payload: AuthPayload, action: &str) -> Result<User> {
        let AuthPayload { token, user } = payload;

        self.storage.set(TOKEN_KEY, &token).await?;
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?).await?;
        self.auth.api().set_token(Some(token)).await;

        let subscription = match self.subscriptions.get_current_subscription().await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Could not load subscription");
                None
            }
        };

        *self.state.write().await = SessionState {
            user: Some(user.clone()),
            subscription,
        };
        log_user_action(&user.id, action, None);
        Ok(user)
    }

    /// Clear the in-memory session and the stored token and user
    pub async fn logout(&self) -> Result<()> {
        let previous = std::mem::take(&mut *self.state.write().await);
        self.auth.api().set_token(None).await;
        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(USER_KEY).await?;

        if let Some(user) = previous.user {
            log_user_action(&user.id, "logout", None);
        }
        Ok(())
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User> {
        self.require_user().await?;

        let user = self.auth.update_profile(request).await?;
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?).await?;
        self.state.write().await.user = Some(user.clone());
        log_user_action(&user.id, "update_profile", None);
        Ok(user)
    }

    /// Re-fetch the subscription. Organizers and admins have the backend
    /// re-read it from Stripe first.
    pub async fn refresh_subscription(&self) -> Result<Option<Subscription>> {
        let user = self.require_user().await?;

        let subscription = if user.can_manage_events() {
            self.subscriptions.sync_subscription().await?
        } else {
            self.subscriptions.get_current_subscription().await?
        };

        debug!(user_id = %user.id, active = subscription.as_ref().is_some_and(Subscription::is_active), "Subscription refreshed");
        self.state.write().await.subscription = subscription.clone();
        Ok(subscription)
    }

    /// Delete the remote account, then sign out locally
    pub async fn delete_account(&self) -> Result<()> {
        let user = self.require_user().await?;
        self.auth.delete_account().await?;
        log_user_action(&user.id, "delete_account", None);
        self.logout().await
    }

    async fn require_user(&self) -> Result<User> {
        self.user()
            .await
            .ok_or_else(|| TicketflowError::Unauthorized("Not signed in".to_string()))
    }
}

/// Whether the token carries an `exp` claim at or before `now`.
///
/// Only the payload is read; tokens that are not JWTs are left to the backend.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.is_some_and(|exp| exp <= now.timestamp()),
        Err(e) => {
            debug!(error = %e, "Token is not a readable JWT");
            false
        }
    }
}
