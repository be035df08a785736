//! Authentication service implementation
//!
//! This service wraps the `/auth` endpoints: login and registration, token
//! verification, profile management and account deletion. Session state is
//! kept by [`crate::state::Session`]; this layer is stateless apart from the
//! shared bearer token.

use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::http::ApiClient;
use crate::models::{AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, User};
use crate::utils::errors::{Result, TicketflowError};
use crate::utils::helpers::is_valid_email;

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody<'a> {
    token: &'a str,
    new_password: &'a str,
}

/// Minimum password length accepted before calling the API
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service for the platform API
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange credentials for a token and user
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(TicketflowError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        debug!(email = %email, "Logging in");
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.post::<_, AuthPayload>("/auth/login", &request).await {
            Ok(payload) => {
                info!(user_id = %payload.user.id, "Login succeeded");
                Ok(payload)
            }
            Err(TicketflowError::Api { message, .. }) | Err(TicketflowError::Unauthorized(message)) => {
                warn!(email = %email, "Login rejected");
                Err(TicketflowError::Authentication(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Create an account and sign in
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload> {
        validate_registration(request)?;

        debug!(email = %request.email, role = %request.role, "Registering user");
        let payload: AuthPayload = self.api.post("/auth/register", request).await?;
        info!(user_id = %payload.user.id, "Registration succeeded");
        Ok(payload)
    }

    /// Check the current token with the backend and return its user
    pub async fn verify_token(&self) -> Result<User> {
        if !self.api.has_token().await {
            return Err(TicketflowError::Unauthorized("No token".to_string()));
        }
        self.api.get("/auth/verify").await
    }

    pub async fn get_profile(&self) -> Result<User> {
        self.api.get("/auth/profile").await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User> {
        if let Some(email) = &request.email {
            if !is_valid_email(email) {
                return Err(TicketflowError::InvalidInput(format!("Invalid email: {}", email)));
            }
        }

        let user: User = self.api.put("/auth/profile", request).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        if request.new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(TicketflowError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        self.api.send_unit(Method::PUT, "/auth/password", Some(request)).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        if !is_valid_email(email) {
            return Err(TicketflowError::InvalidInput(format!("Invalid email: {}", email)));
        }
        self.api
            .send_unit(Method::POST, "/auth/forgot-password", Some(&EmailBody { email: email.trim() }))
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(TicketflowError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let body = ResetPasswordBody { token, new_password };
        self.api.send_unit(Method::POST, "/auth/reset-password", Some(&body)).await
    }

    pub async fn delete_account(&self) -> Result<()> {
        self.api.send_unit::<()>(Method::DELETE, "/auth/account", None).await?;
        info!("Account deleted");
        Ok(())
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<()> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(TicketflowError::InvalidInput("First and last name are required".to_string()));
    }
    if !is_valid_email(&request.email) {
        return Err(TicketflowError::InvalidInput(format!("Invalid email: {}", request.email)));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(TicketflowError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
