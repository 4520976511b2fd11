/*!
 * Watch mode: re-extract marker calls from files as they change.
 *
 * The `notify` watcher runs on its own thread and forwards events through a
 * bounded tokio channel. Each created or modified file that passes the scan
 * filters is read and extracted on its own; nothing is aggregated,
 * reconciled or replaced.
 */

use std::future::Future;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::scan::{PatternMatcher, TextExtractor, TextMatch, discover, relative_path};

/// Capacity of the event channel between the watcher thread and the runtime
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Matches found in one file during watch mode
#[derive(Debug, Clone, PartialEq)]
pub struct WatchReport {
    /// Path relative to the watched root
    pub file: String,
    /// Occurrences in the file's current content
    pub matches: Vec<TextMatch>,
}

/// Watches a project tree and reports marker calls per file
#[derive(Debug, Clone)]
pub struct SourceWatcher {
    root: PathBuf,
    /// `root` with symlinks resolved, as the OS reports event paths
    canonical_root: PathBuf,
    matcher: PatternMatcher,
    extractor: TextExtractor,
}

impl SourceWatcher {
    /// Create a watcher over `root` with the project's filters
    pub fn new(root: impl Into<PathBuf>, matcher: PatternMatcher, extractor: TextExtractor) -> Self {
        let root = root.into();
        let canonical_root = std::fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
        Self {
            root,
            canonical_root,
            matcher,
            extractor,
        }
    }

    /// Whether a path is inside the root and passes the include/exclude filters
    pub fn is_watched(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|relative| self.matcher.matches(&relative))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        [&self.root, &self.canonical_root]
            .into_iter()
            .find(|root| path.starts_with(root))
            .map(|root| relative_path(root, path))
    }

    /// Extract one file; `None` when it has no marker calls
    pub async fn check_file(&self, path: &Path) -> Result<Option<WatchReport>, AppError> {
        let content = FileManager::read_to_string(path).await?;
        let matches = self.extractor.extract(&content);
        if matches.is_empty() {
            return Ok(None);
        }

        Ok(Some(WatchReport {
            file: self
                .relative(path)
                .unwrap_or_else(|| path.display().to_string()),
            matches,
        }))
    }

    /// Extract every selected file once, in discovery order
    pub async fn initial_pass(&self) -> Result<Vec<WatchReport>, AppError> {
        let root = self.root.clone();
        let matcher = self.matcher.clone();
        let paths = tokio::task::spawn_blocking(move || discover(&root, &matcher))
            .await
            .map_err(|e| AppError::Other(format!("Discovery task panicked: {}", e)))??;

        let mut reports = Vec::new();
        for path in paths {
            if let Some(report) = self.check_file(&path).await? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Report the initial pass, then every relevant change, until `shutdown` resolves
    ///
    /// The file watch handle is closed before returning.
    pub async fn run<F, S>(&self, mut report: F, shutdown: S) -> Result<(), AppError>
    where
        F: FnMut(&WatchReport),
        S: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(EVENT_CHANNEL_CAPACITY);
        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| {
                let _ = tx.blocking_send(event);
            },
            Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        for initial in self.initial_pass().await? {
            report(&initial);
        }
        info!("Watching {} for changes", self.root.display());

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = rx.recv() => match event {
                    Some(Ok(event)) => self.handle_event(event, &mut report).await,
                    Some(Err(e)) => warn!("Watch error: {}", e),
                    None => break,
                },
            }
        }

        drop(watcher);
        info!("Stopped watching {}", self.root.display());
        Ok(())
    }

    async fn handle_event<F>(&self, event: Event, report: &mut F)
    where
        F: FnMut(&WatchReport),
    {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }

        for path in event.paths {
            if !path.is_file() || !self.is_watched(&path) {
                continue;
            }
            debug!("Change detected: {}", path.display());
            match self.check_file(&path).await {
                Ok(Some(found)) => report(&found),
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
    }
}
