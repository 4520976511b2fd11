/*!
 * In-place replacement of marker calls with key references.
 *
 * Each file's matches are applied in descending start order against the
 * content captured during the scan, so a splice never moves the offsets of
 * a match that is still to be processed.
 */

use std::collections::HashMap;

use log::{debug, info};

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::scan::{FileMatch, TextMatch};

/// Counts from one replacement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplacementSummary {
    /// Files written back
    pub files_changed: usize,
    /// Marker calls rewritten
    pub replacements: usize,
    /// Marker calls left alone because their text has no key
    pub unresolved: usize,
}

/// Render `call('key')`
pub fn replacement_call(call: &str, key: &str) -> String {
    format!("{}('{}')", call, key)
}

/// Rewrite `content`, replacing every match whose text has a key
///
/// Returns the new content and the number of replaced calls. Matches must
/// come from extracting this exact `content`.
pub fn replace_in_content(
    content: &str,
    matches: &[TextMatch],
    key_by_text: &HashMap<String, String>,
    call: &str,
) -> (String, usize) {
    let mut ordered: Vec<&TextMatch> = matches.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    let mut replaced = 0;
    for m in ordered {
        if let Some(key) = key_by_text.get(&m.text) {
            result.replace_range(m.start..m.end, &replacement_call(call, key));
            replaced += 1;
        }
    }

    (result, replaced)
}

/// Rewrite every file in `files`, one at a time
///
/// Files where nothing was replaced are not touched on disk.
pub async fn apply_replacements(
    files: &[FileMatch],
    key_by_text: &HashMap<String, String>,
    call: &str,
) -> Result<ReplacementSummary, AppError> {
    let mut summary = ReplacementSummary::default();

    for file in files {
        let (content, replaced) = replace_in_content(&file.content, &file.matches, key_by_text, call);
        summary.unresolved += file.matches.len() - replaced;
        if replaced == 0 {
            continue;
        }

        FileManager::write_to_file(&file.path, &content).await?;
        debug!("{}: replaced {} call(s)", file.file, replaced);
        summary.files_changed += 1;
        summary.replacements += replaced;
    }

    info!(
        "Replaced {} call(s) in {} file(s)",
        summary.replacements, summary.files_changed
    );
    Ok(summary)
}
