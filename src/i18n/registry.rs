//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is built once on first access (`OnceLock`) and is immutable
//! afterwards. English is the base language every UI string is authored in;
//! the remaining entries are the Indian classroom languages translations are
//! requested for.

use serde::Serialize;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "hi")
    pub code: &'static str,

    /// English name of the language (e.g., "Hindi")
    pub name: &'static str,

    /// Native name of the language (e.g., "हिन्दी")
    pub native_name: &'static str,

    /// Whether this is the base language UI strings are written in
    pub is_canonical: bool,

    /// Whether this language can be selected
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    /// Invariant: the first entry is the only canonical language.
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, base language first.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the canonical (base) language configuration.
    pub fn canonical(&self) -> &LanguageConfig {
        &self.languages[0]
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Default language configurations.
///
/// Odia is registered but disabled until the translation prompt has been
/// reviewed by a native speaker.
fn default_languages() -> Vec<LanguageConfig> {
    let entry = |code, name, native_name, enabled| LanguageConfig {
        code,
        name,
        native_name,
        is_canonical: false,
        enabled,
    };

    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
        },
        entry("hi", "Hindi", "हिन्दी", true),
        entry("mr", "Marathi", "मराठी", true),
        entry("bn", "Bengali", "বাংলা", true),
        entry("ta", "Tamil", "தமிழ்", true),
        entry("te", "Telugu", "తెలుగు", true),
        entry("kn", "Kannada", "ಕನ್ನಡ", true),
        entry("gu", "Gujarati", "ગુજરાતી", true),
        entry("ml", "Malayalam", "മലയാളം", true),
        entry("pa", "Punjabi", "ਪੰਜਾਬੀ", true),
        entry("or", "Odia", "ଓଡ଼ିଆ", false),
    ]
}
