/*!
 * Recursive file discovery under a scan root.
 */

use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use super::patterns::PatternMatcher;
use crate::errors::AppError;

/// Path of `path` relative to `root`, `/`-separated with no leading separator
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_selectable_file(entry: &walkdir::DirEntry) -> bool {
    if entry.path_is_symlink() {
        return std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file());
    }
    entry.file_type().is_file()
}

/// List every selected file under `root`
///
/// Entries are visited in lexicographic order per directory, so the result is
/// stable for a given file-system snapshot. Excluded directories are never
/// entered. Symlinks to files are selected like regular files; symlinked
/// directories are not descended into and dangling links are skipped. Any
/// unreadable entry fails the whole discovery.
pub fn discover(root: &Path, matcher: &PatternMatcher) -> Result<Vec<PathBuf>, AppError> {
    // Surface an unreadable root as an I/O error rather than an empty result
    std::fs::read_dir(root).map_err(|e| AppError::io(root, e))?;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let relative = relative_path(root, entry.path());
            let pruned = matcher.is_excluded_dir(&relative);
            if pruned {
                debug!("Pruning excluded directory: {}", relative);
            }
            !pruned
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
            AppError::io(path, source)
        })?;

        if !is_selectable_file(&entry) {
            continue;
        }

        let relative = relative_path(root, entry.path());
        if matcher.matches(&relative) {
            files.push(entry.into_path());
        }
    }

    debug!("Discovered {} candidate files under {:?}", files.len(), root);
    Ok(files)
}
