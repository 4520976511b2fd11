/*!
 * Writing pulled messages to per-locale JSON files.
 */

use std::path::{Path, PathBuf};

use log::info;

use crate::database::repository::Messages;
use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Write `<dir>/<locale>.json` for every locale in `messages`
///
/// The directory is created if needed. Returns the written paths in locale order.
pub async fn write_locale_files(dir: &Path, messages: &Messages) -> Result<Vec<PathBuf>, AppError> {
    FileManager::ensure_dir(dir).await?;

    let mut written = Vec::with_capacity(messages.len());
    for (locale, table) in messages {
        let path = dir.join(format!("{}.json", locale));
        FileManager::write_json(&path, table).await?;
        info!("Wrote {} keys to {}", table.len(), path.display());
        written.push(path);
    }

    Ok(written)
}
