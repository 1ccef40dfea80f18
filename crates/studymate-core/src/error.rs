use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur across the retrieval workspace.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text could not be extracted from a single document.
    #[error("Text extraction failed for {document}: {reason}")]
    Extraction {
        /// Name of the document that failed.
        document: String,
        /// Why extraction failed.
        reason: String,
    },

    /// The embedding model could not be loaded.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// The embedding model failed or returned malformed vectors.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The vector index could not be constructed from a batch.
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// The text-generation service failed.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// A provider returned a response that could not be interpreted.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient failures of the models, including the
    /// network calls that reach them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Generation(_))
    }

    /// Builds an extraction error for the named document.
    pub fn extraction(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, from_str};
    use std::io;

    #[test]
    fn test_error_display() {
        let config_error = Error::Config("overlap too large".to_owned());
        assert_eq!(
            config_error.to_string(),
            "Configuration error: overlap too large"
        );

        let model_error = Error::ModelUnavailable("all-minilm".to_owned());
        assert_eq!(
            model_error.to_string(),
            "Embedding model unavailable: all-minilm"
        );

        let extraction_error = Error::extraction("notes.pdf", "not UTF-8");
        assert_eq!(
            extraction_error.to_string(),
            "Text extraction failed for notes.pdf: not UTF-8"
        );
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(Error::Embedding("timeout".to_owned()).is_retryable());
        assert!(Error::Generation("503".to_owned()).is_retryable());

        assert!(!Error::Config("bad config".to_owned()).is_retryable());
        assert!(!Error::ModelUnavailable("missing".to_owned()).is_retryable());
        assert!(!Error::extraction("a.txt", "binary").is_retryable());
        assert!(!Error::MissingApiKey("KEY".to_owned()).is_retryable());
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = from_str::<JsonValue>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
