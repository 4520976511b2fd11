use serde::Serialize;
use std::path::Path;

use crate::errors::AppError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub async fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| AppError::io(path, e))
    }

    /// Read a file to a string
    pub async fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, AppError> {
        let path = path.as_ref();
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::io(path, e))
    }

    /// Write a string to a file, replacing it wholesale
    pub async fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent).await?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| AppError::io(path, e))
    }

    /// Write a value as pretty JSON with a trailing newline
    pub async fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), AppError> {
        let mut json = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Other(format!("Failed to serialize JSON: {}", e)))?;
        json.push('\n');
        Self::write_to_file(path, &json).await
    }
}
