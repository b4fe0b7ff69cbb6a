//! Translation quality validation.
//!
//! UI strings are translated as templates, so the one thing a translation
//! must never lose is its `{{placeholder}}` tokens: a dropped token silently
//! hides the student name or score the template was meant to show.

use crate::i18n::interpolate::placeholders;
use std::collections::BTreeSet;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Critical errors that indicate translation issues
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation quality.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Validate that a translation preserves the placeholders of its template.
    ///
    /// - a placeholder of the original missing from the translation is an error
    /// - a placeholder that only appears in the translation is a warning
    /// - an empty translation of a non-empty original is a warning
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let orig_keys: BTreeSet<&str> = placeholders(original).into_iter().collect();
        let trans_keys: BTreeSet<&str> = placeholders(translated).into_iter().collect();

        let missing: Vec<_> = orig_keys.difference(&trans_keys).collect();
        if !missing.is_empty() {
            report.errors.push(format!(
                "Placeholders dropped by translation: {:?}",
                missing
            ));
        }

        let extra: Vec<_> = trans_keys.difference(&orig_keys).collect();
        if !extra.is_empty() {
            report.warnings.push(format!(
                "Placeholders introduced by translation: {:?}",
                extra
            ));
        }

        if !original.trim().is_empty() && translated.trim().is_empty() {
            report
                .warnings
                .push("Translation is empty for non-empty text".to_string());
        }

        report
    }
}
