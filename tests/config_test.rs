//! Settings loading and validation

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use serial_test::serial;
use ticketflow::config::Settings;
use ticketflow::TicketflowError;

const MISSING: &str = "/nonexistent/ticketflow-config";

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("TICKETFLOW__") {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_defaults_without_file_or_env() {
    clear_env();

    let settings = Settings::load_from(MISSING).unwrap();

    assert_eq!(settings.api.base_url, "http://localhost:5000/api");
    assert_eq!(settings.pricing.currency, "CHF");
    assert_eq!(settings.pricing.cancellation_fee, Decimal::new(250, 2));
    assert_eq!(settings.i18n.supported_languages, vec!["en", "de", "fr"]);
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_file_layered_over_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ticketflow.toml"),
        r#"
[api]
base_url = "https://tickets.example.ch/api"

[pricing]
max_tickets_per_order = 4
"#,
    )
    .unwrap();

    let settings = Settings::load_from(dir.path().join("ticketflow").to_str().unwrap()).unwrap();

    assert_eq!(settings.api.base_url, "https://tickets.example.ch/api");
    assert_eq!(settings.api.timeout_seconds, 30);
    assert_eq!(settings.pricing.max_tickets_per_order, 4);
    assert_eq!(settings.pricing.currency, "CHF");
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    std::env::set_var("TICKETFLOW__API__BASE_URL", "https://staging.example.ch/api");
    std::env::set_var("TICKETFLOW__STRIPE__PUBLISHABLE_KEY", "pk_test_env");
    std::env::set_var("TICKETFLOW__I18N__SUPPORTED_LANGUAGES", "en,de");

    let result = Settings::load_from(MISSING);
    clear_env();
    let settings = result.unwrap();

    assert_eq!(settings.api.base_url, "https://staging.example.ch/api");
    assert_eq!(settings.stripe.publishable_key, "pk_test_env");
    assert_eq!(settings.i18n.supported_languages, vec!["en", "de"]);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut settings = Settings::default();
    settings.stripe.publishable_key = "sk_live_oops".to_string();
    assert_matches!(settings.validate(), Err(TicketflowError::Config(message)) if message.contains("pk_"));

    let mut settings = Settings::default();
    settings.api.base_url = "not a url".to_string();
    assert_matches!(settings.validate(), Err(TicketflowError::Config(_)));

    let mut settings = Settings::default();
    settings.i18n.default_language = "it".to_string();
    assert_matches!(settings.validate(), Err(TicketflowError::Config(_)));

    let mut settings = Settings::default();
    settings.pricing.platform_fee_percent = Decimal::new(150, 0);
    assert_matches!(settings.validate(), Err(TicketflowError::Config(_)));
}
