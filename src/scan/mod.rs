/*!
 * Source scanning: discovery, extraction and deduplication.
 *
 * This module contains the local half of the pipeline:
 * - `patterns`: include/exclude glob matching
 * - `discovery`: recursive directory walk with pruning
 * - `extractor`: marker-call extraction with byte ranges and positions
 * - `index`: cross-file deduplication with location tracking
 */

pub mod discovery;
pub mod extractor;
pub mod index;
pub mod patterns;

use std::path::{Path, PathBuf};

use futures::{StreamExt, TryStreamExt, stream};
use log::debug;

use crate::errors::AppError;
use crate::file_utils::FileManager;

pub use discovery::{discover, relative_path};
pub use extractor::{TextExtractor, TextMatch};
pub use index::{FileMatch, TextLocation, UniqueTextIndex};
pub use patterns::{PatternMatcher, ProjectKind, ScanPattern};

/// Maximum number of files read at the same time
const READ_CONCURRENCY: usize = 16;

/// Outcome of scanning a project tree
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Absolute scan root
    pub root: PathBuf,
    /// Number of files that passed the filters
    pub scanned_files: usize,
    /// Files with at least one match, in discovery order
    pub files: Vec<FileMatch>,
    /// Unique texts across all files
    pub index: UniqueTextIndex,
}

impl ScanResult {
    /// Total number of marker calls found
    pub fn total_matches(&self) -> usize {
        self.files.iter().map(|f| f.matches.len()).sum()
    }
}

/// Discover, read and extract every selected file under `root`
///
/// Files are read concurrently but results are merged in discovery order, so
/// the first-seen order of the index is reproducible.
pub async fn scan_project(
    root: &Path,
    matcher: &PatternMatcher,
    extractor: &TextExtractor,
) -> Result<ScanResult, AppError> {
    let walk_root = root.to_path_buf();
    let walk_matcher = matcher.clone();
    let paths = tokio::task::spawn_blocking(move || discover(&walk_root, &walk_matcher))
        .await
        .map_err(|e| AppError::Other(format!("Discovery task panicked: {}", e)))??;

    let scanned_files = paths.len();
    let contents: Vec<(PathBuf, String)> = stream::iter(paths)
        .map(|path| async move {
            let content = FileManager::read_to_string(&path).await?;
            Ok::<_, AppError>((path, content))
        })
        .buffered(READ_CONCURRENCY)
        .try_collect()
        .await?;

    let mut files = Vec::new();
    for (path, content) in contents {
        let matches = extractor.extract(&content);
        if matches.is_empty() {
            continue;
        }
        let file = relative_path(root, &path);
        debug!("{}: {} marker call(s)", file, matches.len());
        files.push(FileMatch {
            file,
            path,
            content,
            matches,
        });
    }

    let index = UniqueTextIndex::from_files(&files);
    Ok(ScanResult {
        root: root.to_path_buf(),
        scanned_files,
        files,
        index,
    })
}
