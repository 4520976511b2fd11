/*!
 * Provider implementations for the AI translation backend.
 *
 * The backend is an opaque chat-completion service:
 * - OpenAI: any OpenAI-compatible chat completions endpoint
 * - Mock: scripted provider for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A system + user message pair sent to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    /// Instructions for the model
    pub system: String,
    /// The actual request content
    pub user: String,
}

impl ChatPrompt {
    /// Create a new prompt
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the reconciler.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a prompt and return the assistant's text
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod openai;
