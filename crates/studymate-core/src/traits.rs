use async_trait::async_trait;

use crate::{Document, Result};

/// Turns a raw document into its full plain text.
///
/// Implementations for binary formats (PDF and friends) live outside this
/// workspace; the batch chunker treats any error as a per-document skip.
pub trait DocumentExtractor: Send + Sync {
    /// Extract the document's text as a single string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Extraction`] when the document cannot be decoded.
    fn extract(&self, document: &Document) -> Result<String>;
}

/// Trait for text-generation services that turn a prompt into an answer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the unique identifier for this generator.
    fn name(&self) -> &'static str;

    /// Checks whether this generator is currently able to serve requests.
    async fn is_available(&self) -> bool;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, rejects the request,
    /// or returns a response that cannot be parsed.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
