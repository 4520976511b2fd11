/*!
 * Database module for persistent storage of translation entries.
 *
 * This module provides SQLite-based persistence for:
 * - Translation sheets (one per project scope) and their target locales
 * - Keyed translation entries, searchable by source-locale text for reuse
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{EntryRecord, NewEntry, SheetRecord, Translations};
pub use repository::Repository;
