//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub stripe: StripeConfig,
    pub storage: StorageConfig,
    pub pricing: PricingConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Platform REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Stripe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeConfig {
    pub publishable_key: String,
    pub api_url: String,
}

/// Local session persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// JSON file holding `token` and `user`; in-memory only when unset
    pub session_path: Option<String>,
}

/// Client-side price estimates. The backend computes the real amounts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    pub currency: String,
    pub platform_fee_percent: Decimal,
    pub cancellation_fee: Decimal,
    pub max_tickets_per_order: u32,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub translations_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables.
    ///
    /// Environment variables use the `TICKETFLOW__` prefix with `__` between
    /// sections, e.g. `TICKETFLOW__API__BASE_URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load settings from a named configuration file layered over the defaults
    pub fn load_from(file_name: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(file_name).required(false))
            .add_source(
                config::Environment::with_prefix("TICKETFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("i18n.supported_languages")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TicketflowError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                timeout_seconds: 30,
                user_agent: format!("ticketflow/{}", env!("CARGO_PKG_VERSION")),
            },
            stripe: StripeConfig {
                publishable_key: String::new(),
                api_url: "https://api.stripe.com".to_string(),
            },
            storage: StorageConfig { session_path: None },
            pricing: PricingConfig {
                currency: "CHF".to_string(),
                platform_fee_percent: Decimal::new(10, 0),
                cancellation_fee: Decimal::new(250, 2),
                max_tickets_per_order: 10,
            },
            i18n: I18nConfig {
                default_language: "en".to_string(),
                supported_languages: vec!["en".to_string(), "de".to_string(), "fr".to_string()],
                translations_dir: "translations".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
