/*!
 * Reuse-then-translate reconciliation against the local translation store.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};

use super::keys::KeyAllocator;
use super::prompt::{build_prompt, parse_response};
use super::{ReconciliationResult, TranslationEntry};
use crate::database::repository::CANDIDATE_LOOKUP_LIMIT;
use crate::database::{EntryRecord, NewEntry, Repository};
use crate::errors::AppError;
use crate::providers::Provider;

fn storage(error: anyhow::Error) -> AppError {
    AppError::Storage(error.to_string())
}

/// Resolves unique texts to keyed translations for one sheet
#[derive(Debug, Clone)]
pub struct Reconciler {
    repo: Repository,
    provider: Arc<dyn Provider>,
    candidate_limit: usize,
}

impl Reconciler {
    /// Create a reconciler over a store and an AI backend
    pub fn new(repo: Repository, provider: Arc<dyn Provider>) -> Self {
        Self {
            repo,
            provider,
            candidate_limit: CANDIDATE_LOOKUP_LIMIT,
        }
    }

    /// Override how many stored candidates are considered per text
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    /// Reconcile `texts` (source locale `source_locale`) for `sheet_id`
    ///
    /// Returns one entry per distinct text in input order. An AI failure
    /// yields `success: false` and leaves the store untouched, including
    /// the same-sheet reuse computed earlier in the call.
    pub async fn reconcile(
        &self,
        texts: &[String],
        source_locale: &str,
        sheet_id: &str,
    ) -> Result<ReconciliationResult, AppError> {
        let sheet = self
            .repo
            .get_sheet(sheet_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| AppError::Storage(format!("Sheet {} does not exist", sheet_id)))?;

        let mut seen: HashSet<&String> = HashSet::new();
        let texts: Vec<String> = texts
            .iter()
            .filter(|t| seen.insert(*t))
            .cloned()
            .collect();
        if texts.is_empty() {
            return Ok(ReconciliationResult::succeeded(Vec::new()));
        }

        let candidates = self
            .repo
            .find_by_source_text(sheet_id, source_locale, &texts, self.candidate_limit)
            .await
            .map_err(storage)?;

        let mut resolved: HashMap<String, TranslationEntry> = HashMap::new();
        let mut touched: Vec<i64> = Vec::new();
        let mut foreign: Vec<(&String, &EntryRecord)> = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for text in &texts {
            let found = candidates.get(text).map(Vec::as_slice).unwrap_or_default();
            if let Some(own) = found.first().filter(|c| c.sheet_id == sheet_id) {
                resolved.insert(
                    text.clone(),
                    TranslationEntry::new(own.key.clone(), own.translations.clone()),
                );
                touched.push(own.id);
            } else if let Some(newest) = found.first() {
                foreign.push((text, newest));
            } else {
                pending.push(text.clone());
            }
        }

        debug!(
            "Sheet {}: {} reused in place, {} from other sheets, {} to translate",
            sheet_id,
            resolved.len(),
            foreign.len(),
            pending.len()
        );

        if foreign.is_empty() && pending.is_empty() {
            self.repo
                .commit_reconciliation(Vec::new(), touched)
                .await
                .map_err(storage)?;
            return Ok(ReconciliationResult::succeeded(Self::ordered(&texts, resolved)));
        }

        let generated = if pending.is_empty() {
            Vec::new()
        } else {
            let mut languages = sheet.languages.clone();
            if languages.is_empty() {
                languages.push(source_locale.to_string());
            }

            let prompt = build_prompt(source_locale, &languages, &pending);
            info!("Requesting translations for {} new texts", pending.len());

            let raw = match self.provider.complete(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("AI backend failed: {}", e);
                    return Ok(ReconciliationResult::failed(vec![e.to_string()]));
                }
            };
            match parse_response(&raw, pending.len()) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("{}", e);
                    return Ok(ReconciliationResult::failed(vec![e.to_string()]));
                }
            }
        };

        let existing = self.repo.sheet_keys(sheet_id).await.map_err(storage)?;
        let mut keys = KeyAllocator::new(existing);
        let mut new_entries = Vec::with_capacity(foreign.len() + generated.len());

        for (text, candidate) in foreign {
            let key = keys.allocate(&candidate.key);
            touched.push(candidate.id);
            new_entries.push(NewEntry::new(
                sheet_id,
                key,
                text.clone(),
                candidate.translations.clone(),
            ));
        }

        for (text, entry) in pending.iter().zip(generated) {
            let key = keys.allocate(&entry.key);
            let mut translations = entry.translations;
            translations.insert(source_locale.to_string(), text.clone());
            new_entries.push(NewEntry::new(sheet_id, key, text.clone(), translations));
        }

        let inserted = self
            .repo
            .commit_reconciliation(new_entries, touched)
            .await
            .map_err(storage)?;

        for record in inserted {
            resolved.insert(
                record.original_text,
                TranslationEntry::new(record.key, record.translations),
            );
        }

        Ok(ReconciliationResult::succeeded(Self::ordered(&texts, resolved)))
    }

    fn ordered(texts: &[String], mut resolved: HashMap<String, TranslationEntry>) -> Vec<TranslationEntry> {
        texts.iter().filter_map(|t| resolved.remove(t)).collect()
    }
}
