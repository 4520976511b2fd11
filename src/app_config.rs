//! Application configuration module
//! This module handles loading and validating the per-project
//! `.grey-parrot.json` file and resolving credentials next to it.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::database::DatabaseConnection;
use crate::database::repository::CANDIDATE_LOOKUP_LIMIT;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils::validate_locale;
use crate::scan::{ProjectKind, ScanPattern};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = ".grey-parrot.json";

/// Environment variable holding the dashboard bearer token
pub const TOKEN_VAR: &str = "GREY_PARROT_TOKEN";

/// Environment variable holding the AI backend key for local runs
pub const AI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Represents the project configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Sheet (scope) identifier on the dashboard
    #[serde(deserialize_with = "string_or_number")]
    pub project_id: String,

    /// Dashboard base URL
    #[serde(default)]
    pub dashboard_url: String,

    /// Locale of the marked source texts
    pub default_locale: String,

    /// Directory to scan, relative to the config file
    #[serde(default = "default_scan_dir")]
    pub scan_dir: String,

    /// Include globs; empty means the `js` preset
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude globs; empty means the `js` preset
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Destination of pulled locale files
    #[serde(default = "default_langs_dir")]
    pub langs_dir: String,

    /// Call token marking translatable literals
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Call token written in place of replaced literals
    #[serde(default = "default_replacement_call")]
    pub replacement_call: String,

    /// Log level
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Offline reconciliation settings
    #[serde(default)]
    pub local: Option<LocalConfig>,

    /// Directory containing the config file; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Settings for reconciling against the local store
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfig {
    // @field: SQLite file, relative to the config file
    #[serde(default)]
    pub database: Option<String>,

    // @field: Target locales of the sheet
    #[serde(default)]
    pub languages: Vec<String>,

    // @field: Other-sheet candidates considered per text during reuse
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    // @field: AI backend settings
    #[serde(default)]
    pub ai: AiConfig,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            database: None,
            languages: Vec::new(),
            candidate_limit: default_candidate_limit(),
            ai: AiConfig::default(),
        }
    }
}

/// OpenAI-compatible backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    // @field: Base URL of the chat completions API
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_ai_model")]
    pub model: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_scan_dir() -> String {
    ".".to_string()
}

fn default_langs_dir() -> String {
    "locales".to_string()
}

fn default_marker() -> String {
    "$tt".to_string()
}

fn default_replacement_call() -> String {
    "$t".to_string()
}

fn default_candidate_limit() -> usize {
    CANDIDATE_LOOKUP_LIMIT
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    120
}

/// Accept `"projectId": 12` as well as `"projectId": "12"`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

impl ProjectConfig {
    /// Config path to use: the explicit one, or the default file in the working directory
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load and validate the configuration at `path`
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(AppError::ConfigurationMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let mut config: ProjectConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;

        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and normalise locale codes
    pub fn validate(&mut self) -> Result<(), AppError> {
        if self.project_id.trim().is_empty() {
            return Err(AppError::InvalidConfiguration(
                "projectId must not be empty".to_string(),
            ));
        }

        if !self.dashboard_url.is_empty() {
            url::Url::parse(&self.dashboard_url).map_err(|e| {
                AppError::InvalidConfiguration(format!(
                    "dashboardUrl {:?} is not a valid URL: {}",
                    self.dashboard_url, e
                ))
            })?;
        }

        self.default_locale = validate_locale(&self.default_locale)
            .map_err(|e| AppError::InvalidConfiguration(format!("defaultLocale: {}", e)))?;

        if self.marker.trim().is_empty() || self.replacement_call.trim().is_empty() {
            return Err(AppError::InvalidConfiguration(
                "marker and replacementCall must not be empty".to_string(),
            ));
        }

        if let Some(local) = self.local.as_mut() {
            local.languages = local
                .languages
                .iter()
                .map(|l| validate_locale(l))
                .collect::<anyhow::Result<Vec<_>>>()
                .map_err(|e| AppError::InvalidConfiguration(format!("local.languages: {}", e)))?;
        }

        Ok(())
    }

    /// Absolute-or-relative root of the scan
    pub fn scan_root(&self) -> PathBuf {
        self.base_dir.join(&self.scan_dir)
    }

    /// Directory pulled locale files are written to
    pub fn langs_dir(&self) -> PathBuf {
        self.base_dir.join(&self.langs_dir)
    }

    /// Include/exclude globs, falling back to the `js` preset per empty list
    pub fn scan_pattern(&self) -> ScanPattern {
        let preset = ScanPattern::preset(ProjectKind::Js);
        ScanPattern::new(
            if self.include.is_empty() {
                preset.include
            } else {
                self.include.clone()
            },
            if self.exclude.is_empty() {
                preset.exclude
            } else {
                self.exclude.clone()
            },
        )
    }

    /// Dashboard URL, required for remote operations
    pub fn require_dashboard_url(&self) -> Result<&str, AppError> {
        if self.dashboard_url.is_empty() {
            return Err(AppError::InvalidConfiguration(
                "dashboardUrl is required unless --local is used".to_string(),
            ));
        }
        Ok(&self.dashboard_url)
    }

    /// Local settings, defaulted when the config has none
    pub fn local_config(&self) -> LocalConfig {
        self.local.clone().unwrap_or_default()
    }

    /// Path of the local SQLite store
    pub fn database_path(&self) -> Result<PathBuf, AppError> {
        match self.local.as_ref().and_then(|l| l.database.as_ref()) {
            Some(db) => Ok(self.base_dir.join(db)),
            None => DatabaseConnection::default_database_path()
                .map_err(|e| AppError::Storage(e.to_string())),
        }
    }
}

/// Look up `var` in the `.env` file at `path` without touching the process environment
///
/// Lines that fail to parse are skipped.
pub fn dotenv_value(path: &Path, var: &str) -> Option<String> {
    if !FileManager::file_exists(path) {
        return None;
    }

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    let mut found = None;
    for entry in entries {
        match entry {
            Ok((key, value)) if key == var => found = Some(value),
            Ok(_) => {}
            Err(e) => debug!("Skipping line in {}: {}", path.display(), e),
        }
    }
    found
}

/// Resolve a credential from the environment, then from `.env` in `dir`
pub fn resolve_credential(var: &str, dir: &Path) -> Result<String, AppError> {
    resolve_credential_with(var, std::env::var(var).ok(), dir)
}

/// Like `resolve_credential`, with the environment value supplied by the caller
pub fn resolve_credential_with(
    var: &str,
    env_value: Option<String>,
    dir: &Path,
) -> Result<String, AppError> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }

    if let Some(value) = dotenv_value(&dir.join(".env"), var).filter(|v| !v.is_empty()) {
        return Ok(value);
    }

    Err(AppError::MissingCredential(var.to_string()))
}
