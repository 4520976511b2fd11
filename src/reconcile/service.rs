/*!
 * The seam between the pipeline and whatever owns the translation sheets.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{ReconciliationResult, Reconciler};
use crate::database::Repository;
use crate::database::repository::Messages;
use crate::errors::AppError;
use crate::providers::Provider;

/// Owner of translation sheets: reconciles texts and serves messages
#[async_trait]
pub trait SheetService: Send + Sync {
    /// Resolve `texts` (in `source_locale`) to keyed translations in sheet `scope_id`
    async fn reconcile(
        &self,
        scope_id: &str,
        texts: &[String],
        source_locale: &str,
    ) -> Result<ReconciliationResult, AppError>;

    /// Locale → key → text for every language of sheet `scope_id`
    async fn messages(&self, scope_id: &str) -> Result<Messages, AppError>;
}

/// In-process sheet service backed by the local store
#[derive(Debug, Clone)]
pub struct LocalSheet {
    repo: Repository,
    reconciler: Reconciler,
    languages: Vec<String>,
}

impl LocalSheet {
    /// Create a local service; `languages` are the sheet's target locales
    pub fn new(repo: Repository, provider: Arc<dyn Provider>, languages: Vec<String>) -> Self {
        Self {
            reconciler: Reconciler::new(repo.clone(), provider),
            repo,
            languages,
        }
    }

    /// Replace the reconciler, e.g. to change its candidate limit
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    async fn ensure_sheet(&self, scope_id: &str, source_locale: Option<&str>) -> Result<(), AppError> {
        let mut languages = self.languages.clone();
        if let Some(source) = source_locale {
            if !languages.iter().any(|l| l == source) {
                languages.insert(0, source.to_string());
            }
        }

        self.repo
            .ensure_sheet(scope_id, scope_id, &languages)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        debug!("Local sheet {} languages: {}", scope_id, languages.join(", "));
        Ok(())
    }
}

#[async_trait]
impl SheetService for LocalSheet {
    async fn reconcile(
        &self,
        scope_id: &str,
        texts: &[String],
        source_locale: &str,
    ) -> Result<ReconciliationResult, AppError> {
        self.ensure_sheet(scope_id, Some(source_locale)).await?;
        self.reconciler.reconcile(texts, source_locale, scope_id).await
    }

    async fn messages(&self, scope_id: &str) -> Result<Messages, AppError> {
        if self
            .repo
            .get_sheet(scope_id)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
            .is_none()
        {
            self.ensure_sheet(scope_id, None).await?;
        }

        self.repo
            .messages(scope_id)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}
