/*!
 * Marker-call extraction.
 *
 * Matching is textual, not syntactic: a marker token, `(`, a single- or
 * double-quoted literal, an optional `, { ... }` parameter object, then `)`.
 * The parameter object is not balanced; the first `}` closes it.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Default marker token flagging a translatable literal
pub const DEFAULT_MARKER: &str = "$tt";

/// One marker-call occurrence in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMatch {
    /// Literal contents, exactly as written (no escape processing)
    pub text: String,
    /// The whole matched call expression
    pub full_match: String,
    /// Byte offset of the call start in the original content
    pub start: usize,
    /// Byte offset one past the call end in the original content
    pub end: usize,
    /// 1-based line of the call start
    pub line_number: usize,
    /// Byte offset of the call start within its line
    pub column: usize,
    /// Raw parameter object source, unvalidated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
}

static DEFAULT_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&marker_pattern(DEFAULT_MARKER)).expect("Invalid default marker regex")
});

fn marker_pattern(marker: &str) -> String {
    format!(
        r#"{}\(\s*['"](.+?)['"](?:\s*,\s*(\{{[^}}]+\}}))?\)"#,
        regex::escape(marker)
    )
}

/// Extractor for one marker token
#[derive(Debug, Clone)]
pub struct TextExtractor {
    regex: Regex,
}

impl TextExtractor {
    /// Build an extractor recognising `<marker>('...')` calls
    pub fn new(marker: &str) -> Result<Self, AppError> {
        if marker == DEFAULT_MARKER {
            return Ok(Self::default());
        }
        let regex = Regex::new(&marker_pattern(marker))
            .map_err(|e| AppError::Pattern(format!("marker '{}': {}", marker, e)))?;
        Ok(Self { regex })
    }

    /// Extract every marker call from `content`, left to right
    pub fn extract(&self, content: &str) -> Vec<TextMatch> {
        let mut matches = Vec::new();
        // Line bookkeeping advances incrementally since matches are ordered
        let mut line_number = 1;
        let mut line_start = 0;
        let mut cursor = 0;

        for caps in self.regex.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            let start = whole.start();

            for (offset, _) in content[cursor..start].match_indices('\n') {
                line_number += 1;
                line_start = cursor + offset + 1;
            }
            cursor = start;

            matches.push(TextMatch {
                text: caps[1].to_string(),
                full_match: whole.as_str().to_string(),
                start,
                end: whole.end(),
                line_number,
                column: start - line_start,
                params: caps.get(2).map(|m| m.as_str().to_string()),
            });
        }

        matches
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            regex: DEFAULT_MARKER_REGEX.clone(),
        }
    }
}
