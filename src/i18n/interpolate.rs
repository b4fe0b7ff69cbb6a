//! `{{placeholder}}` substitution for UI string templates.
//!
//! Templates are translated with their placeholders intact, so the cache is
//! keyed by the template and values are substituted on every lookup.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Named values substituted into a template.
pub type Params<'a> = [(&'a str, &'a dyn fmt::Display)];

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid")
    })
}

/// Replace every `{{key}}` in `template` with the matching value.
///
/// Keys without a value are left as literal `{{key}}` text. Substituted
/// values are not scanned again.
pub fn interpolate<'t>(template: &'t str, params: &Params<'_>) -> Cow<'t, str> {
    if params.is_empty() || !template.contains("{{") {
        return Cow::Borrowed(template);
    }

    placeholder_regex().replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        match params.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => value.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// List the placeholder keys referenced by a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
