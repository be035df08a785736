//! Translation loader and i18n management
//!
//! This module provides the core internationalization functionality including
//! translation loading, language detection, message formatting and
//! pluralization.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::I18nConfig;
use crate::utils::errors::{Result, TicketflowError};

const BUNDLED: [(&str, &str); 3] = [
    ("en", include_str!("../../translations/en.json")),
    ("de", include_str!("../../translations/de.json")),
    ("fr", include_str!("../../translations/fr.json")),
];

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded translations by language code
    translations: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Supported language codes
    supported_languages: Vec<String>,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance with no catalogues loaded
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }

    /// Create an instance preloaded with the catalogues shipped in the crate
    pub fn with_bundled(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self::new(config);
        for (lang_code, content) in BUNDLED {
            if i18n.is_language_supported(lang_code) {
                i18n.add_language_json(lang_code, content)?;
            }
        }
        Ok(i18n)
    }

    /// Load translation files from `dir`, overriding bundled catalogues
    pub async fn load_translations(&mut self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            warn!(dir = %dir.display(), "Translations directory not found, keeping loaded catalogues");
            return self.ensure_default_loaded();
        }

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = dir.join(format!("{}.json", lang_code));

            if !file_path.exists() {
                warn!("Translation file not found: {}", file_path.display());
                continue;
            }

            match fs::read_to_string(&file_path).await {
                Ok(content) => match self.add_language_json(lang_code, &content) {
                    Ok(()) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => error!("Failed to load translations for {}: {}", lang_code, e),
                },
                Err(e) => error!("Failed to read {}: {}", file_path.display(), e),
            }
        }

        self.ensure_default_loaded()
    }

    /// Parse and register one catalogue
    pub fn add_language_json(&mut self, lang_code: &str, content: &str) -> Result<()> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => {
                debug!("Loaded {} translation keys for {}", count_keys(&map), lang_code);
                self.translations.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(TicketflowError::Config(format!(
                "Invalid translation file format for {}",
                lang_code
            ))),
        }
    }

    fn ensure_default_loaded(&self) -> Result<()> {
        if self.translations.contains_key(&self.default_language) {
            Ok(())
        } else {
            Err(TicketflowError::Config(format!(
                "No translations available for default language: {}",
                self.default_language
            )))
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let value = self
            .get_translation_value(key, effective_lang)
            .or_else(|| self.get_translation_value(key, &self.default_language));

        match value {
            Some(translation) => format_message(&extract_text_from_value(translation), params),
            None => {
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with pluralization support.
    ///
    /// Looks up `<key>.<form>` and injects `{count}`.
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = format!("{}.{}", key, plural_form(count, effective_lang));

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        self.t(&plural_key, effective_lang, Some(&final_params))
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.iter().any(|l| l == lang)
    }

    /// Get the effective language (fallback to default if not supported or not loaded)
    fn get_effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Get translation value from nested JSON structure, e.g. `checkout.errors.quantity`
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.translations.get(lang)?.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect a supported language from a locale such as `de-CH` or an
    /// `Accept-Language` header value
    pub fn detect_language(&self, locale: Option<&str>) -> String {
        if let Some(locale) = locale {
            for candidate in locale.split(',') {
                let tag = candidate.split(';').next().unwrap_or(candidate).trim();
                let lang_code = tag.split(['-', '_']).next().unwrap_or(tag).to_lowercase();

                if self.is_language_supported(&lang_code) {
                    return lang_code;
                }
            }
        }

        self.default_language.clone()
    }

    /// Get translation statistics
    pub fn get_stats(&self) -> TranslationStats {
        let mut stats = TranslationStats {
            languages: Vec::new(),
            total_keys: 0,
        };

        for (lang, translations) in &self.translations {
            let key_count = count_keys(translations);
            stats.languages.push(LanguageStats {
                code: lang.clone(),
                key_count,
            });
            if lang == &self.default_language {
                stats.total_keys = key_count;
            }
        }
        stats.languages.sort_by(|a, b| a.code.cmp(&b.code));

        stats
    }

    /// Keys present in the default catalogue but missing from `lang`
    pub fn missing_keys(&self, lang: &str) -> Vec<String> {
        let (Some(default), Some(other)) = (
            self.translations.get(&self.default_language),
            self.translations.get(lang),
        ) else {
            return Vec::new();
        };

        let mut missing = Vec::new();
        collect_missing(default, other, "", &mut missing);
        missing.sort();
        missing
    }
}

/// Extract text from JSON value (handle both strings and plural objects)
fn extract_text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            if let Some(other) = obj.get("other") {
                extract_text_from_value(other)
            } else if let Some((_, first_value)) = obj.iter().next() {
                extract_text_from_value(first_value)
            } else {
                String::new()
            }
        }
        _ => value.to_string(),
    }
}

/// Format message with `{name}` parameters
fn format_message(template: &str, params: Option<&TranslationParams>) -> String {
    match params {
        Some(params) => {
            let mut result = template.to_string();
            for (key, value) in params {
                result = result.replace(&format!("{{{}}}", key), value);
            }
            result
        }
        None => template.to_string(),
    }
}

/// Determine plural form based on language-specific rules
fn plural_form(count: i64, lang: &str) -> &'static str {
    match lang {
        // French: 0 and 1 are singular
        "fr" => {
            if count.unsigned_abs() <= 1 {
                "one"
            } else {
                "other"
            }
        }
        _ => {
            if count == 1 {
                "one"
            } else {
                "other"
            }
        }
    }
}

/// Recursively count translation keys
fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

fn collect_missing(reference: &Map<String, Value>, other: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in reference {
        let path = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
        match (value, other.get(key)) {
            (Value::Object(nested), Some(Value::Object(other_nested))) => {
                collect_missing(nested, other_nested, &path, out)
            }
            (_, Some(_)) => {}
            (_, None) => out.push(path),
        }
    }
}

/// Translation statistics
#[derive(Debug, Clone)]
pub struct TranslationStats {
    pub languages: Vec<LanguageStats>,
    pub total_keys: usize,
}

/// Language-specific statistics
#[derive(Debug, Clone)]
pub struct LanguageStats {
    pub code: String,
    pub key_count: usize,
}
