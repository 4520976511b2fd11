/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Answers every prompt with well-formed YAML
 * - `MockProvider::malformed()` - Answers with text that is not YAML
 * - `MockProvider::empty()` - Answers with an empty string
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ChatPrompt, Provider};
use crate::reconcile::keys::slugify;
use crate::reconcile::prompt::{
    GeneratedBatch, GeneratedEntry, SOURCE_LANGUAGE_LABEL, TARGET_LANGUAGES_LABEL,
};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Translates every numbered text in the prompt
    Working,
    /// Returns a response that is not valid YAML
    Malformed,
    /// Returns an empty response
    Empty,
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing reconciliation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of completed calls, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, shared between clones
    prompts: Arc<Mutex<Vec<ChatPrompt>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&ChatPrompt) -> String>,
}

/// What the mock understood from a user message
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedRequest {
    source: String,
    targets: Vec<String>,
    texts: Vec<String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns unparsable responses
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom response generator, used in `Working` mode
    pub fn with_custom_response(mut self, generator: fn(&ChatPrompt) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `complete` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every prompt received so far
    pub fn prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().clone()
    }

    /// Render a fenced YAML answer for the given texts
    ///
    /// Keys are the slugged texts; the source locale gets the text itself and
    /// every other locale gets `[locale] text`.
    pub fn generate_batch_response(source: &str, targets: &[String], texts: &[String]) -> String {
        let batch = GeneratedBatch {
            entries: texts
                .iter()
                .map(|text| GeneratedEntry {
                    key: slugify(text),
                    translations: targets
                        .iter()
                        .map(|lang| {
                            let translated = if lang == source {
                                text.clone()
                            } else {
                                format!("[{}] {}", lang, text)
                            };
                            (lang.clone(), translated)
                        })
                        .collect(),
                })
                .collect(),
        };

        let yaml = serde_yml::to_string(&batch).unwrap_or_default();
        format!("```yaml\n{}```", yaml)
    }

    fn parse_request(user: &str) -> ParsedRequest {
        let mut request = ParsedRequest {
            source: String::new(),
            targets: Vec::new(),
            texts: Vec::new(),
        };

        for line in user.lines() {
            if let Some(rest) = line.strip_prefix(SOURCE_LANGUAGE_LABEL) {
                request.source = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(TARGET_LANGUAGES_LABEL) {
                request.targets = rest
                    .split(',')
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
            } else if let Some((number, text)) = line.split_once(". ") {
                if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                    request.texts.push(text.to_string());
                }
            }
        }

        if request.targets.is_empty() && !request.source.is_empty() {
            request.targets.push(request.source.clone());
        }
        request
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        match self.behavior {
            MockBehavior::Working => {
                if let Some(generator) = self.custom_response {
                    return Ok(generator(prompt));
                }
                let request = Self::parse_request(&prompt.user);
                Ok(Self::generate_batch_response(
                    &request.source,
                    &request.targets,
                    &request.texts,
                ))
            }

            MockBehavior::Malformed => Ok("Sorry, I cannot help with: [unbalanced".to_string()),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
        }
    }
}
