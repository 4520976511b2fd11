use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{AI_KEY_VAR, ProjectConfig, TOKEN_VAR, resolve_credential};
use crate::database::Repository;
use crate::errors::AppError;
use crate::providers::Provider;
use crate::providers::openai::OpenAI;
use crate::pull::write_locale_files;
use crate::reconcile::{DashboardClient, LocalSheet, Reconciler, SheetService, TranslationEntry};
use crate::replace::{ReplacementSummary, apply_replacements};
use crate::scan::{ScanResult, TextExtractor, UniqueTextIndex, scan_project};
use crate::watch::{SourceWatcher, WatchReport};

// @module: Application controller for the extraction pipeline

/// Options of the `trans` command
#[derive(Debug, Clone, Copy, Default)]
pub struct TransOptions {
    /// Rewrite source files after reconciliation
    pub replace: bool,
    /// Reconcile against the local store instead of the dashboard
    pub local: bool,
}

/// What a `trans` run produced
#[derive(Debug)]
pub struct TransOutcome {
    /// Scan of the project tree
    pub scan: ScanResult,
    /// Resolved entries, in submission order
    pub entries: Vec<TranslationEntry>,
    /// Replacement counts, when `--replace` was given
    pub replacement: Option<ReplacementSummary>,
    /// Locale files written by the pull step
    pub locale_files: Vec<PathBuf>,
}

/// Main application controller for the pipeline
pub struct Controller {
    // @field: Project configuration
    config: ProjectConfig,
    // @field: Injected sheet service; built from config when absent
    service: Option<Arc<dyn SheetService>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            service: None,
        }
    }

    /// Create a controller that uses `service` for every sheet operation
    pub fn with_service(config: ProjectConfig, service: Arc<dyn SheetService>) -> Self {
        Self {
            config,
            service: Some(service),
        }
    }

    /// Project configuration
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Sheet service for this run
    ///
    /// Credentials are resolved here, so a missing token only fails once a
    /// network call is about to happen.
    fn sheet_service(&self, local: bool) -> Result<Arc<dyn SheetService>, AppError> {
        if let Some(service) = &self.service {
            return Ok(Arc::clone(service));
        }

        if local {
            let local_config = self.config.local_config();
            let api_key = resolve_credential(AI_KEY_VAR, &self.config.base_dir)?;
            let provider = OpenAI::new(
                api_key,
                local_config.ai.endpoint.clone(),
                local_config.ai.model.clone(),
                local_config.ai.temperature,
                local_config.ai.timeout_secs,
            );
            let repo = Repository::open(self.config.database_path()?)
                .map_err(|e| AppError::Storage(e.to_string()))?;
            debug!("Using local store at {}", repo.connection().path().display());
            if let Ok(stats) = repo.connection().stats() {
                debug!("{}", stats);
            }
            let provider: Arc<dyn Provider> = Arc::new(provider);
            let reconciler = Reconciler::new(repo.clone(), Arc::clone(&provider))
                .with_candidate_limit(local_config.candidate_limit);
            return Ok(Arc::new(
                LocalSheet::new(repo, provider, local_config.languages).with_reconciler(reconciler),
            ));
        }

        let url = self.config.require_dashboard_url()?;
        let token = resolve_credential(TOKEN_VAR, &self.config.base_dir)?;
        Ok(Arc::new(DashboardClient::new(url, token)))
    }

    /// Scan the project: discovery, extraction and deduplication
    pub async fn scan(&self) -> Result<ScanResult, AppError> {
        let matcher = self.config.scan_pattern().compile()?;
        let extractor = TextExtractor::new(&self.config.marker)?;
        let root = self.config.scan_root();
        if !root.is_dir() {
            return Err(AppError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "scan directory not found"),
            ));
        }

        scan_project(&root, &matcher, &extractor).await
    }

    /// `scan` command: report matches per file and duplicates, no network
    pub async fn run_scan(&self) -> Result<ScanResult, AppError> {
        let result = self.scan().await?;

        for file in &result.files {
            info!("{}: {} marker call(s)", file.file, file.matches.len());
            for m in &file.matches {
                info!("  - {} (line {})", m.text, m.line_number);
            }
        }
        Self::report_duplicates(&result.index);
        info!(
            "Scanned {} file(s): {} marker call(s), {} unique text(s)",
            result.scanned_files,
            result.total_matches(),
            result.index.len()
        );
        Ok(result)
    }

    /// `trans` command: scan, reconcile, then replace and pull concurrently
    pub async fn trans(&self, options: TransOptions) -> Result<TransOutcome, AppError> {
        let start_time = Instant::now();

        let spinner = Self::spinner("Scanning project files...");
        let scan = match self.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                spinner.abandon_with_message("Scan failed");
                return Err(e);
            }
        };
        spinner.finish_with_message(format!(
            "Scanned {} file(s), {} unique text(s)",
            scan.scanned_files,
            scan.index.len()
        ));
        Self::report_duplicates(&scan.index);

        if scan.index.is_empty() {
            info!("No marked texts found");
            return Ok(TransOutcome {
                scan,
                entries: Vec::new(),
                replacement: None,
                locale_files: Vec::new(),
            });
        }

        let service = self.sheet_service(options.local)?;
        let texts = scan.index.texts().to_vec();

        let spinner = Self::spinner(format!("Submitting {} text(s)...", texts.len()));
        let reconciled = service
            .reconcile(&self.config.project_id, &texts, &self.config.default_locale)
            .await
            .and_then(|result| result.into_entries());
        let entries = match reconciled {
            Ok(entries) => entries,
            Err(e) => {
                spinner.abandon_with_message("Submission failed");
                return Err(e);
            }
        };
        spinner.finish_with_message(format!("Submitted {} text(s)", texts.len()));
        Self::report_translations(&entries);

        let key_by_text = Self::key_map(&entries, &self.config.default_locale);
        let spinner = Self::spinner(if options.replace {
            "Replacing texts and pulling translations..."
        } else {
            "Pulling translations..."
        });

        let replace = async {
            if options.replace {
                apply_replacements(&scan.files, &key_by_text, &self.config.replacement_call)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let (replacement, pulled) = tokio::join!(replace, self.pull_with(service.as_ref()));

        let replacement = match replacement {
            Ok(summary) => summary,
            Err(e) => {
                spinner.abandon_with_message("Replacement failed");
                return Err(e);
            }
        };
        let locale_files = pulled.unwrap_or_else(|e| {
            warn!("Pulling translations failed: {}", e);
            Vec::new()
        });
        spinner.finish_with_message("Done");

        info!(
            "Finished in {}",
            Self::format_duration(start_time.elapsed())
        );
        Ok(TransOutcome {
            scan,
            entries,
            replacement,
            locale_files,
        })
    }

    /// `pull` command: fetch messages and write one file per locale
    pub async fn pull(&self, local: bool) -> Result<Vec<PathBuf>, AppError> {
        let service = self.sheet_service(local)?;
        let spinner = Self::spinner("Fetching translations...");
        match self.pull_with(service.as_ref()).await {
            Ok(files) => {
                spinner.finish_with_message(format!(
                    "Wrote {} locale file(s) to {}",
                    files.len(),
                    self.config.langs_dir().display()
                ));
                Ok(files)
            }
            Err(e) => {
                spinner.abandon_with_message("Pull failed");
                Err(e)
            }
        }
    }

    async fn pull_with(&self, service: &dyn SheetService) -> Result<Vec<PathBuf>, AppError> {
        let messages = service.messages(&self.config.project_id).await?;
        write_locale_files(&self.config.langs_dir(), &messages).await
    }

    /// `watch` command: report matches as files change, until Ctrl-C
    pub async fn watch(&self) -> Result<(), AppError> {
        let watcher = SourceWatcher::new(
            self.config.scan_root(),
            self.config.scan_pattern().compile()?,
            TextExtractor::new(&self.config.marker)?,
        );

        watcher
            .run(Self::report_watch, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await
    }

    /// Text → key, taken from each entry's translation in `locale`
    pub fn key_map(entries: &[TranslationEntry], locale: &str) -> HashMap<String, String> {
        entries
            .iter()
            .filter_map(|entry| {
                entry
                    .translations
                    .get(locale)
                    .map(|text| (text.clone(), entry.key.clone()))
            })
            .collect()
    }

    fn report_duplicates(index: &UniqueTextIndex) {
        let duplicates = index.duplicates();
        if duplicates.is_empty() {
            return;
        }

        warn!("Found {} duplicate text(s):", duplicates.len());
        for (text, locations) in duplicates {
            warn!("\"{}\" appears in:", text);
            for location in locations {
                warn!("  {}:{}", location.file, location.line);
            }
        }
    }

    fn report_translations(entries: &[TranslationEntry]) {
        for entry in entries {
            info!("{}:", entry.key);
            for (lang, text) in &entry.translations {
                info!("  {}: {}", lang, text);
            }
        }
    }

    fn report_watch(report: &WatchReport) {
        info!("[{}] {} marker call(s):", report.file, report.matches.len());
        for m in &report.matches {
            info!("  - {} (line {})", m.text, m.line_number);
        }
    }

    fn spinner(message: impl Into<std::borrow::Cow<'static, str>>) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
