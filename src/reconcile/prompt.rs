/*!
 * Prompt construction and response parsing for the AI translation stage.
 *
 * The backend is asked for YAML of the form:
 *
 * ```yaml
 * entries:
 *   - key: first_semantic_key
 *     translations:
 *       en: First text
 *       fr: Premier texte
 * ```
 */

use serde::{Deserialize, Serialize};

use crate::database::Translations;
use crate::errors::AppError;
use crate::language_utils::describe_locale;
use crate::providers::ChatPrompt;

/// Prefix of the source-language line in the user message
pub const SOURCE_LANGUAGE_LABEL: &str = "Source language:";
/// Prefix of the target-language line in the user message
pub const TARGET_LANGUAGES_LABEL: &str = "Target languages:";
/// Header preceding the numbered texts in the user message
pub const TEXTS_LABEL: &str = "Texts:";

/// One entry proposed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEntry {
    /// Proposed semantic key, not yet normalised
    pub key: String,
    /// Translations by locale
    #[serde(default)]
    pub translations: Translations,
}

/// Top-level shape of the backend's YAML answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedBatch {
    /// Entries in the order of the submitted texts
    #[serde(default)]
    pub entries: Vec<GeneratedEntry>,
}

/// Build the chat prompt for one batch of untranslated texts
pub fn build_prompt(source_locale: &str, languages: &[String], texts: &[String]) -> ChatPrompt {
    let described: Vec<String> = languages.iter().map(|l| describe_locale(l)).collect();

    let system = format!(
        "You are an expert translator fluent in many languages. \
         Translate each of the following texts into these languages: {}.\n\
         Also generate a semantic key for each text, using only lowercase letters, digits and underscores.\n\
         Return the entries in the same order as the texts, as YAML only, for example:\n\
         entries:\n  \
           - key: first_semantic_key\n    \
             translations:\n      \
               {}: First translation\n  \
           - key: second_semantic_key\n    \
             translations:\n      \
               {}: Second translation",
        described.join(", "),
        languages.first().map(String::as_str).unwrap_or(source_locale),
        languages.first().map(String::as_str).unwrap_or(source_locale),
    );

    let mut user = format!(
        "{} {}\n{} {}\n{}\n",
        SOURCE_LANGUAGE_LABEL,
        source_locale,
        TARGET_LANGUAGES_LABEL,
        languages.join(", "),
        TEXTS_LABEL
    );
    for (i, text) in texts.iter().enumerate() {
        user.push_str(&format!("{}. {}\n", i + 1, text));
    }

    ChatPrompt::new(system, user)
}

/// Remove Markdown code fences the model may wrap its YAML in
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```yaml", "")
        .replace("```yml", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse the backend's answer for a batch of `expected` texts
///
/// An empty answer, unparsable YAML, no entries, or an entry count that
/// differs from `expected` all fail the whole batch.
pub fn parse_response(raw: &str, expected: usize) -> Result<Vec<GeneratedEntry>, AppError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(AppError::Reconciliation(
            "AI backend returned an empty response".to_string(),
        ));
    }

    let batch: GeneratedBatch = serde_yml::from_str(&body).map_err(|e| {
        AppError::Reconciliation(format!("Failed to parse AI response as YAML: {}", e))
    })?;

    if batch.entries.is_empty() {
        return Err(AppError::Reconciliation(
            "AI response contained no entries".to_string(),
        ));
    }

    if batch.entries.len() != expected {
        return Err(AppError::Reconciliation(format!(
            "AI response has {} entries for {} texts",
            batch.entries.len(),
            expected
        )));
    }

    Ok(batch.entries)
}
