//! Language utilities for locale code handling
//!
//! Locale codes in project configuration look like `en`, `zh-CN` or `pt_BR`.
//! Only the primary language subtag is checked against ISO 639; region and
//! script subtags are passed through untouched.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Split a locale code into its primary language subtag
pub fn primary_subtag(locale: &str) -> &str {
    locale
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
}

/// Resolve the ISO 639 language behind a locale code
fn lookup(locale: &str) -> Option<Language> {
    let primary = primary_subtag(locale).to_lowercase();
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Validate a locale code, returning its normalized form
///
/// The primary subtag is lowercased; anything after it is kept as written.
pub fn validate_locale(locale: &str) -> Result<String> {
    let trimmed = locale.trim();
    if lookup(trimmed).is_none() {
        return Err(anyhow!("Invalid locale code: {}", locale));
    }

    let primary = primary_subtag(trimmed);
    let rest = &trimmed[primary.len()..];
    Ok(format!("{}{}", primary.to_lowercase(), rest))
}

/// Get the English name of the language behind a locale code
pub fn get_language_name(locale: &str) -> Result<String> {
    lookup(locale)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid locale code: {}", locale))
}

/// Describe a locale for prompts, e.g. `zh-CN (Chinese)`
pub fn describe_locale(locale: &str) -> String {
    match get_language_name(locale) {
        Ok(name) => format!("{} ({})", locale, name),
        Err(_) => locale.to_string(),
    }
}
