/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale code → translated text
pub type Translations = BTreeMap<String, String>;

/// Translation sheet (one project scope)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRecord {
    /// Scope identifier (the project id)
    pub id: String,
    /// Display name
    pub name: String,
    /// Target locales for this sheet
    pub languages: Vec<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

/// Stored translation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Row id
    pub id: i64,
    /// Owning sheet
    pub sheet_id: String,
    /// Key, unique within the sheet
    pub key: String,
    /// Source text the entry was created from
    pub original_text: String,
    /// Translations by locale
    pub translations: Translations,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last time the entry was created, matched or reused (RFC 3339)
    pub updated_at: String,
}

/// Entry to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Owning sheet
    pub sheet_id: String,
    /// Resolved key
    pub key: String,
    /// Source text
    pub original_text: String,
    /// Translations by locale
    pub translations: Translations,
}

impl NewEntry {
    /// Create a new entry for a sheet
    pub fn new(
        sheet_id: impl Into<String>,
        key: impl Into<String>,
        original_text: impl Into<String>,
        translations: Translations,
    ) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            key: key.into(),
            original_text: original_text.into(),
            translations,
        }
    }
}
