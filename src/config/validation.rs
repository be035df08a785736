//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use rust_decimal::Decimal;
use url::Url;

use super::Settings;
use crate::utils::errors::{Result, TicketflowError};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_stripe_config(&settings.stripe)?;
    validate_pricing_config(&settings.pricing)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(TicketflowError::Config("API base URL is required".to_string()));
    }

    Url::parse(&config.base_url)
        .map_err(|e| TicketflowError::Config(format!("Invalid API base URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(TicketflowError::Config(
            "API timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate Stripe configuration
fn validate_stripe_config(config: &super::StripeConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(TicketflowError::Config("Stripe API URL is required".to_string()));
    }

    Url::parse(&config.api_url)
        .map_err(|e| TicketflowError::Config(format!("Invalid Stripe API URL: {}", e)))?;

    // The key is optional for browsing; it only becomes necessary at checkout.
    if !config.publishable_key.is_empty() && !config.publishable_key.starts_with("pk_") {
        return Err(TicketflowError::Config(
            "Stripe publishable key must start with pk_".to_string(),
        ));
    }

    Ok(())
}

/// Validate pricing configuration
fn validate_pricing_config(config: &super::PricingConfig) -> Result<()> {
    if config.currency.len() != 3 {
        return Err(TicketflowError::Config(format!(
            "Invalid currency code: {}",
            config.currency
        )));
    }

    if config.platform_fee_percent < Decimal::ZERO || config.platform_fee_percent > Decimal::ONE_HUNDRED {
        return Err(TicketflowError::Config(
            "Platform fee percent must be between 0 and 100".to_string(),
        ));
    }

    if config.cancellation_fee < Decimal::ZERO {
        return Err(TicketflowError::Config(
            "Cancellation fee cannot be negative".to_string(),
        ));
    }

    if config.max_tickets_per_order == 0 {
        return Err(TicketflowError::Config(
            "Max tickets per order must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(TicketflowError::Config("Default language is required".to_string()));
    }

    if config.supported_languages.is_empty() {
        return Err(TicketflowError::Config(
            "At least one supported language is required".to_string(),
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(TicketflowError::Config(
            "Default language must be in supported languages list".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TicketflowError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TicketflowError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(matches!(validate_settings(&settings), Err(TicketflowError::Config(_))));
    }

    #[test]
    fn test_fee_out_of_range() {
        let mut settings = Settings::default();
        settings.pricing.platform_fee_percent = Decimal::new(150, 0);
        assert!(validate_settings(&settings).is_err());

        settings.pricing.platform_fee_percent = Decimal::new(10, 0);
        settings.pricing.cancellation_fee = Decimal::new(-1, 0);
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_secret_key_rejected_as_publishable() {
        let mut settings = Settings::default();
        settings.stripe.publishable_key = "sk_live_123".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.stripe.publishable_key = "pk_test_123".to_string();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_default_language_must_be_supported() {
        let mut settings = Settings::default();
        settings.i18n.default_language = "it".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
