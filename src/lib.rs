/*!
 * # greyparrot - translation key extraction and reconciliation
 *
 * A Rust library and CLI that finds literals marked for translation in a
 * source tree, reconciles them against a translation sheet, and rewrites
 * the marked calls into key references.
 *
 * ## Features
 *
 * - Glob-filtered discovery with pruning of excluded directories
 * - Marker-call extraction with exact byte ranges and line/column positions
 * - Project-wide deduplication with duplicate reporting
 * - Reuse of existing translations, same sheet first, then other sheets
 * - AI translation and key generation for genuinely new texts
 * - Offset-safe in-place replacement
 * - Watch mode for live extraction feedback
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Project configuration and credentials
 * - `scan`: Pattern matching, discovery, extraction and deduplication
 * - `reconcile`: Reuse-then-translate reconciliation:
 *   - `reconcile::client`: Dashboard HTTP client
 *   - `reconcile::reconciler`: Local reconciliation against the store
 *   - `reconcile::keys`: Key slugging and collision resolution
 *   - `reconcile::prompt`: AI prompt and response handling
 * - `database`: SQLite translation store
 * - `providers`: AI backend clients (OpenAI-compatible, mock)
 * - `replace`: In-place source rewriting
 * - `pull`: Locale file output
 * - `watch`: File-system watch mode
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod pull;
pub mod reconcile;
pub mod replace;
pub mod scan;
pub mod watch;

// Re-export main types for easier usage
pub use app_config::ProjectConfig;
pub use app_controller::{Controller, TransOptions, TransOutcome};
pub use errors::{AppError, ProviderError};
pub use reconcile::{ReconciliationResult, SheetService, TranslationEntry};
pub use scan::{FileMatch, ScanPattern, TextExtractor, TextMatch, UniqueTextIndex};
