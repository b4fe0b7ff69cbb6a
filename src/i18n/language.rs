//! Language type: a validated, `Copy` handle onto a registry entry.

use crate::error::LanguageError;
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated language.
///
/// Only codes that exist in the registry and are enabled can be turned into a
/// `Language`, so holders never need to re-check support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "hi")
    code: &'static str,
}

impl Language {
    /// The base language UI strings are authored in.
    pub const ENGLISH: Language = Language { code: "en" };

    pub const HINDI: Language = Language { code: "hi" };

    pub const MARATHI: Language = Language { code: "mr" };

    /// Create a Language from a language code string.
    ///
    /// Surrounding whitespace and case are ignored, so profile values such as
    /// `" HI "` resolve to Hindi.
    ///
    /// # Example
    /// ```ignore
    /// let hindi = Language::from_code("hi")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language, LanguageError> {
        let normalized = code.trim().to_ascii_lowercase();

        match LanguageRegistry::get().get_by_code(&normalized) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => Err(LanguageError::Disabled(normalized)),
            None => Err(LanguageError::Unknown(code.to_string())),
        }
    }

    /// Get the canonical (base) language.
    pub fn canonical() -> Language {
        Language {
            code: LanguageRegistry::get().canonical().code,
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    pub fn config(&self) -> &'static LanguageConfig {
        let registry = LanguageRegistry::get();
        registry
            .get_by_code(self.code)
            .unwrap_or_else(|| registry.canonical())
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the base language (no translation needed).
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
