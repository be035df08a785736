//! Error handling for Ticketflow
//!
//! This module defines the main error types used throughout the crate
//! and maps them onto the categories the user interface cares about.

use thiserror::Error;

use crate::i18n::I18n;

/// Main error type for Ticketflow
#[derive(Error, Debug)]
pub enum TicketflowError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payment error: {0}")]
    Stripe(#[from] StripeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Stripe specific errors
#[derive(Error, Debug)]
pub enum StripeError {
    /// Card declined, incorrect CVC and the like. The message is Stripe's own.
    #[error("{message}")]
    Card {
        message: String,
        code: Option<String>,
        decline_code: Option<String>,
    },

    #[error("Stripe request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid client secret")]
    InvalidClientSecret,

    #[error("Payment requires additional action: {status}")]
    RequiresAction { status: String },

    #[error("Invalid Stripe response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for Ticketflow operations
pub type Result<T> = std::result::Result<T, TicketflowError>;

/// Result type alias for Stripe operations
pub type StripeResult<T> = std::result::Result<T, StripeError>;

/// How a failure is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caught before any network call, shown inline
    Validation,
    /// HTTP or API failure
    Network,
    /// Payment processor failure, message shown verbatim
    Payment,
    Internal,
}

impl TicketflowError {
    /// Check if the error is recoverable by re-attempting the action
    pub fn is_recoverable(&self) -> bool {
        match self {
            TicketflowError::Http(_) => true,
            TicketflowError::Api { status, .. } => *status >= 500 || *status == 429,
            TicketflowError::Unauthorized(_) => false,
            TicketflowError::Stripe(_) => true,
            TicketflowError::Config(_) => false,
            TicketflowError::Authentication(_) => true,
            TicketflowError::PermissionDenied(_) => false,
            TicketflowError::NotFound { .. } => false,
            TicketflowError::InvalidStateTransition { .. } => false,
            TicketflowError::InvalidInput(_) => true,
            TicketflowError::Cancelled => true,
            TicketflowError::Serialization(_) => false,
            TicketflowError::Io(_) => true,
            TicketflowError::UrlParse(_) => false,
            TicketflowError::Token(_) => false,
            TicketflowError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TicketflowError::Config(_) => ErrorSeverity::Critical,
            TicketflowError::Serialization(_) => ErrorSeverity::Critical,
            TicketflowError::Unauthorized(_) => ErrorSeverity::Warning,
            TicketflowError::PermissionDenied(_) => ErrorSeverity::Warning,
            TicketflowError::Authentication(_) => ErrorSeverity::Warning,
            TicketflowError::Stripe(_) => ErrorSeverity::Warning,
            TicketflowError::InvalidInput(_) => ErrorSeverity::Info,
            TicketflowError::Cancelled => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Classify the error the way the views surface it
    pub fn category(&self) -> ErrorCategory {
        match self {
            TicketflowError::InvalidInput(_) | TicketflowError::InvalidStateTransition { .. } => {
                ErrorCategory::Validation
            }
            TicketflowError::Stripe(_) => ErrorCategory::Payment,
            TicketflowError::Http(_)
            | TicketflowError::Api { .. }
            | TicketflowError::Unauthorized(_)
            | TicketflowError::Authentication(_)
            | TicketflowError::PermissionDenied(_)
            | TicketflowError::NotFound { .. }
            | TicketflowError::Cancelled
            | TicketflowError::ServiceUnavailable(_) => ErrorCategory::Network,
            _ => ErrorCategory::Internal,
        }
    }

    /// Message to show to the user.
    ///
    /// Validation, Stripe and API messages are passed through as-is; everything
    /// else falls back to a translated generic message.
    pub fn user_message(&self, i18n: &I18n, lang: &str) -> String {
        match self {
            TicketflowError::InvalidInput(message) => message.clone(),
            TicketflowError::Stripe(e) => e.to_string(),
            TicketflowError::Api { message, .. } if !message.is_empty() => message.clone(),
            TicketflowError::Unauthorized(_) => i18n.t("errors.session_expired", lang, None),
            TicketflowError::Cancelled => i18n.t("errors.cancelled", lang, None),
            TicketflowError::Http(_) | TicketflowError::ServiceUnavailable(_) => {
                i18n.t("errors.network", lang, None)
            }
            _ => i18n.t("errors.generic", lang, None),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
