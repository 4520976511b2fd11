/*!
 * Reconciliation of unique source texts against stored translations.
 *
 * A batch of texts is resolved in priority order:
 * 1. entries already stored in the same sheet are reused as-is
 * 2. entries from other sheets are copied in under a collision-free key
 * 3. whatever is left goes to the AI backend as a single batch
 *
 * Two `SheetService` implementations exist: `DashboardClient` talks to the
 * remote dashboard, `LocalSheet` runs the `Reconciler` against the local store.
 */

use serde::{Deserialize, Serialize};

use crate::database::Translations;
use crate::errors::AppError;

pub mod client;
pub mod keys;
pub mod prompt;
pub mod reconciler;
pub mod service;

pub use client::DashboardClient;
pub use keys::{KeyAllocator, slugify};
pub use reconciler::Reconciler;
pub use service::{LocalSheet, SheetService};

/// Key and translations resolved for one source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Key, unique within the sheet
    pub key: String,
    /// Translations by locale
    pub translations: Translations,
}

impl TranslationEntry {
    /// Create a new entry
    pub fn new(key: impl Into<String>, translations: Translations) -> Self {
        Self {
            key: key.into(),
            translations,
        }
    }
}

/// Outcome of reconciling one batch of texts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Whether the whole batch was resolved
    pub success: bool,
    /// One entry per submitted text, in submission order
    #[serde(default)]
    pub entries: Vec<TranslationEntry>,
    /// Error messages when `success` is false
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ReconciliationResult {
    /// A successful result
    pub fn succeeded(entries: Vec<TranslationEntry>) -> Self {
        Self {
            success: true,
            entries,
            errors: Vec::new(),
        }
    }

    /// A failed result; carries no entries
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            entries: Vec::new(),
            errors,
        }
    }

    /// Entries of a successful result, or the joined errors as a `Reconciliation` error
    pub fn into_entries(self) -> Result<Vec<TranslationEntry>, AppError> {
        if self.success {
            Ok(self.entries)
        } else if self.errors.is_empty() {
            Err(AppError::Reconciliation("unknown error".to_string()))
        } else {
            Err(AppError::Reconciliation(self.errors.join("; ")))
        }
    }
}
