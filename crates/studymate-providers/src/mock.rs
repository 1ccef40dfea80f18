//! Mock generator for testing answer flows.
//!
//! Returns canned responses for prompts containing a pattern, so question
//! answering can be tested end to end without a model server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use studymate_core::{Error, IgnoreLock as _, Result, TextGenerator};

/// Ordered `(pattern, response)` pairs.
type ResponseList = Arc<Mutex<Vec<(String, String)>>>;

/// Generator that returns pre-defined responses based on prompt patterns.
#[derive(Clone, Default)]
pub struct MockGenerator {
    /// Responses checked in insertion order
    responses: ResponseList,
    /// Response when no pattern matches
    default_response: Arc<Mutex<Option<String>>>,
    /// Error message returned instead of any response
    failure: Arc<Mutex<Option<String>>>,
    /// Every prompt received, for verification
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    /// Create a mock with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `response` to any prompt containing `pattern`.
    ///
    /// Patterns are tried in the order they were added.
    #[must_use]
    pub fn with_response(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .lock_ignore_poison()
            .push((pattern.into(), response.into()));
        self
    }

    /// Set the response for prompts that match no pattern.
    #[must_use]
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.default_response.lock_ignore_poison() = Some(response.into());
        self
    }

    /// Make every call fail with [`Error::Generation`].
    #[must_use]
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.failure.lock_ignore_poison() = Some(message.into());
        self
    }

    /// Clear the call history.
    pub fn clear_history(&self) {
        self.call_history.lock_ignore_poison().clear();
    }

    /// Every prompt received so far.
    #[must_use]
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }

    fn find_response(&self, prompt: &str) -> Option<String> {
        self.responses
            .lock_ignore_poison()
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_history.lock_ignore_poison().push(prompt.to_owned());

        let failure = self.failure.lock_ignore_poison().clone();
        if let Some(message) = failure {
            return Err(Error::Generation(message));
        }

        Ok(self.find_response(prompt).unwrap_or_else(|| {
            self.default_response
                .lock_ignore_poison()
                .clone()
                .unwrap_or_else(|| format!("Mock response for prompt: {prompt}"))
        }))
    }
}
