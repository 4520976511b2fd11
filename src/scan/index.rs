/*!
 * Cross-file deduplication of extracted texts.
 */

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use super::extractor::TextMatch;

/// Where one occurrence of a text was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLocation {
    /// Path relative to the scan root
    pub file: String,
    /// 1-based line number
    pub line: usize,
}

/// Matches found in one file, with the content they were computed against
///
/// Offsets in `matches` are only valid for `content`; replacement edits this
/// exact string instead of re-reading the file.
#[derive(Debug, Clone)]
pub struct FileMatch {
    /// Path relative to the scan root
    pub file: String,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Content as read during the scan
    pub content: String,
    /// Occurrences, in file order
    pub matches: Vec<TextMatch>,
}

/// Unique texts in first-seen order, each with every location it occurs at
#[derive(Debug, Clone, Default)]
pub struct UniqueTextIndex {
    order: Vec<String>,
    locations: HashMap<String, Vec<TextLocation>>,
}

impl UniqueTextIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from files in processing order
    pub fn from_files(files: &[FileMatch]) -> Self {
        let mut index = Self::new();
        for file in files {
            index.record(&file.file, &file.matches);
        }
        index
    }

    /// Append the locations of one file's matches
    pub fn record(&mut self, file: &str, matches: &[TextMatch]) {
        for m in matches {
            let location = TextLocation {
                file: file.to_string(),
                line: m.line_number,
            };
            match self.locations.get_mut(&m.text) {
                Some(existing) => existing.push(location),
                None => {
                    self.order.push(m.text.clone());
                    self.locations.insert(m.text.clone(), vec![location]);
                }
            }
        }
    }

    /// Unique texts in first-seen order
    pub fn texts(&self) -> &[String] {
        &self.order
    }

    /// Every recorded location of `text`
    pub fn locations(&self, text: &str) -> &[TextLocation] {
        self.locations.get(text).map(Vec::as_slice).unwrap_or_default()
    }

    /// Texts seen more than once, in first-seen order
    pub fn duplicates(&self) -> Vec<(&str, &[TextLocation])> {
        self.order
            .iter()
            .map(|text| (text.as_str(), self.locations(text)))
            .filter(|(_, locations)| locations.len() > 1)
            .collect()
    }

    /// Number of unique texts
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no text was recorded
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of recorded occurrences
    pub fn total_locations(&self) -> usize {
        self.locations.values().map(Vec::len).sum()
    }
}
