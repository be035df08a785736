//! Internationalization module
//!
//! Translation catalogues, language detection, message formatting and
//! pluralization for the supported UI languages.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, LanguageStats, TranslationParams, TranslationStats};
