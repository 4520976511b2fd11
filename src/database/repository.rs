/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use chrono::SecondsFormat;
use log::debug;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::connection::DatabaseConnection;
use super::models::{EntryRecord, NewEntry, SheetRecord, Translations};

/// Maximum number of stored entries considered per source text
pub const CANDIDATE_LOOKUP_LIMIT: usize = 50;

/// Locale → key → translated text
pub type Messages = BTreeMap<String, BTreeMap<String, String>>;

const ENTRY_COLUMNS: &str =
    "id, sheet_id, key, original_text, translations, created_at, updated_at";

/// Current time as a fixed-width RFC 3339 string, so text ordering is time ordering
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, index: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn parse_entry_row(row: &Row) -> rusqlite::Result<EntryRecord> {
    Ok(EntryRecord {
        id: row.get(0)?,
        sheet_id: row.get(1)?,
        key: row.get(2)?,
        original_text: row.get(3)?,
        translations: json_column(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn parse_sheet_row(row: &Row) -> rusqlite::Result<SheetRecord> {
    Ok(SheetRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        languages: json_column(row, 2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Repository for database operations
#[derive(Debug, Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Sheet Operations
    // =========================================================================

    /// Create a sheet, or update its name and languages if it exists
    pub async fn ensure_sheet(
        &self,
        sheet_id: &str,
        name: &str,
        languages: &[String],
    ) -> Result<SheetRecord> {
        let sheet_id = sheet_id.to_string();
        let name = name.to_string();
        let languages_json = serde_json::to_string(languages)?;
        let now = now_timestamp();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO sheets (id, name, languages, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        languages = excluded.languages,
                        updated_at = excluded.updated_at
                    "#,
                    params![sheet_id, name, languages_json, now],
                )?;

                Self::get_sheet_sync(conn, &sheet_id)?
                    .ok_or_else(|| anyhow::anyhow!("Sheet {} vanished after upsert", sheet_id))
            })
            .await
    }

    /// Get a sheet by id
    pub async fn get_sheet(&self, sheet_id: &str) -> Result<Option<SheetRecord>> {
        let sheet_id = sheet_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_sheet_sync(conn, &sheet_id))
            .await
    }

    fn get_sheet_sync(conn: &Connection, sheet_id: &str) -> Result<Option<SheetRecord>> {
        let sheet = conn
            .query_row(
                "SELECT id, name, languages, created_at, updated_at FROM sheets WHERE id = ?1",
                [sheet_id],
                parse_sheet_row,
            )
            .optional()?;
        Ok(sheet)
    }

    /// All keys currently assigned in a sheet
    pub async fn sheet_keys(&self, sheet_id: &str) -> Result<HashSet<String>> {
        let sheet_id = sheet_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare("SELECT key FROM entries WHERE sheet_id = ?1")?;
                let keys = stmt
                    .query_map([&sheet_id], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<HashSet<_>>>()?;
                Ok(keys)
            })
            .await
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    /// Find stored entries whose `translations[locale]` equals a text
    ///
    /// For each text the newest entry of `sheet_id` comes first, if there is
    /// one, followed by up to `limit` entries of other sheets, most recently
    /// updated first. The cap never hides a same-sheet entry. Texts without
    /// candidates are absent from the map.
    pub async fn find_by_source_text(
        &self,
        sheet_id: &str,
        locale: &str,
        texts: &[String],
        limit: usize,
    ) -> Result<HashMap<String, Vec<EntryRecord>>> {
        let sheet_id = sheet_id.to_string();
        let json_path = format!("$.\"{}\"", locale.replace('"', ""));
        let texts = texts.to_vec();
        let limit = limit as i64;

        self.db
            .execute_async(move |conn| {
                let mut own_stmt = conn.prepare(&format!(
                    r#"
                    SELECT {ENTRY_COLUMNS} FROM entries
                    WHERE sheet_id = ?1 AND json_extract(translations, ?2) = ?3
                    ORDER BY updated_at DESC, id DESC
                    LIMIT 1
                    "#
                ))?;
                let mut other_stmt = conn.prepare(&format!(
                    r#"
                    SELECT {ENTRY_COLUMNS} FROM entries
                    WHERE sheet_id != ?1 AND json_extract(translations, ?2) = ?3
                    ORDER BY updated_at DESC, id DESC
                    LIMIT ?4
                    "#
                ))?;

                let mut found = HashMap::new();
                for text in texts {
                    let mut candidates = own_stmt
                        .query_map(params![sheet_id, json_path, text], parse_entry_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    candidates.extend(
                        other_stmt
                            .query_map(params![sheet_id, json_path, text, limit], parse_entry_row)?
                            .collect::<rusqlite::Result<Vec<_>>>()?,
                    );
                    if !candidates.is_empty() {
                        found.insert(text, candidates);
                    }
                }
                Ok(found)
            })
            .await
    }

    /// Insert an entry stamped with the current time
    pub async fn insert_entry(&self, entry: &NewEntry) -> Result<EntryRecord> {
        self.insert_entry_at(entry, &now_timestamp()).await
    }

    /// Insert an entry with an explicit creation/update timestamp
    pub async fn insert_entry_at(&self, entry: &NewEntry, timestamp: &str) -> Result<EntryRecord> {
        let entry = entry.clone();
        let timestamp = timestamp.to_string();

        self.db
            .execute_async(move |conn| Self::insert_entry_sync(conn, &entry, &timestamp))
            .await
    }

    fn insert_entry_sync(conn: &Connection, entry: &NewEntry, timestamp: &str) -> Result<EntryRecord> {
        conn.execute(
            r#"
            INSERT INTO entries (sheet_id, key, original_text, translations, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                entry.sheet_id,
                entry.key,
                entry.original_text,
                serde_json::to_string(&entry.translations)?,
                timestamp,
            ],
        )?;

        Ok(EntryRecord {
            id: conn.last_insert_rowid(),
            sheet_id: entry.sheet_id.clone(),
            key: entry.key.clone(),
            original_text: entry.original_text.clone(),
            translations: entry.translations.clone(),
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        })
    }

    /// Persist the outcome of one reconciliation atomically
    ///
    /// New entries are inserted and reused entries get their `updated_at`
    /// bumped, all in one transaction. Returns the inserted records in input
    /// order.
    pub async fn commit_reconciliation(
        &self,
        new_entries: Vec<NewEntry>,
        reused_ids: Vec<i64>,
    ) -> Result<Vec<EntryRecord>> {
        let now = now_timestamp();

        self.db
            .transaction_async(move |tx| {
                for id in &reused_ids {
                    tx.execute(
                        "UPDATE entries SET updated_at = ?1 WHERE id = ?2",
                        params![now, id],
                    )?;
                }

                let mut inserted = Vec::with_capacity(new_entries.len());
                for entry in &new_entries {
                    inserted.push(Self::insert_entry_sync(tx, entry, &now)?);
                }

                debug!(
                    "Committed {} new entries, touched {} reused entries",
                    inserted.len(),
                    reused_ids.len()
                );
                Ok(inserted)
            })
            .await
    }

    /// All entries of a sheet, oldest first
    pub async fn list_entries(&self, sheet_id: &str) -> Result<Vec<EntryRecord>> {
        let sheet_id = sheet_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE sheet_id = ?1 ORDER BY id"
                ))?;
                let entries = stmt
                    .query_map([&sheet_id], parse_entry_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
    }

    /// Per-locale key → text maps for a sheet, limited to the sheet's languages
    pub async fn messages(&self, sheet_id: &str) -> Result<Messages> {
        let sheet = self
            .get_sheet(sheet_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Sheet {} does not exist", sheet_id))?;
        let entries = self.list_entries(sheet_id).await?;

        let mut messages: Messages = sheet
            .languages
            .iter()
            .map(|lang| (lang.clone(), BTreeMap::new()))
            .collect();

        for entry in entries {
            for (lang, text) in entry.translations {
                if let Some(table) = messages.get_mut(&lang) {
                    table.insert(entry.key.clone(), text);
                }
            }
        }

        Ok(messages)
    }
}

/// Build a translations map from `(locale, text)` pairs
pub fn translations<I, L, T>(pairs: I) -> Translations
where
    I: IntoIterator<Item = (L, T)>,
    L: Into<String>,
    T: Into<String>,
{
    pairs
        .into_iter()
        .map(|(lang, text)| (lang.into(), text.into()))
        .collect()
}
