//! Embedding providers backed by Ollama.

use std::future::Future;

use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use studymate_core::{EmbeddingConfig, Error, Result};
use tokio::process::Command;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Trait for generating embeddings from text
pub trait EmbeddingProvider: Send + Sync {
    /// Name of the model producing the vectors
    fn model_name(&self) -> &str;

    /// Ensure the embedding model is available
    ///
    /// # Errors
    /// Returns an error if the model is not available or cannot be loaded
    fn ensure_model_available(&self) -> impl Future<Output = Result<()>> + Send;

    /// Embed multiple texts, one vector per text, in input order
    ///
    /// # Errors
    /// Returns an error if any embedding generation fails
    fn embed_batch(
        &self,
        texts: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Embedding>>> + Send;
}

/// Ollama embedding client
pub struct OllamaEmbeddingClient {
    ollama: Ollama,
    model: String,
    pull_missing: bool,
}

impl OllamaEmbeddingClient {
    /// Create a client for the configured host and model.
    ///
    /// # Errors
    /// Returns a configuration error if the host is not an `http(s)` URL.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            ollama: Ollama::from_url(config.service_url()?),
            model: config.model.clone(),
            pull_missing: config.pull_missing,
        })
    }

    /// Server the client talks to.
    pub fn url(&self) -> &str {
        self.ollama.url_str()
    }

    /// Pull the model using the Ollama CLI with inherited stdio for progress
    async fn pull_model(&self) -> Result<()> {
        tracing::info!("Embedding model '{}' not found", self.model);
        tracing::info!("Pulling model from Ollama (this may take a few minutes)...");
        tracing::info!("    Running: ollama pull {}", self.model);

        let status = Command::new("ollama")
            .args(["pull", &self.model])
            .status()
            .await
            .map_err(|error| {
                Error::ModelUnavailable(format!(
                    "Failed to run 'ollama pull {}': {error}. Is Ollama installed?",
                    self.model
                ))
            })?;

        if !status.success() {
            return Err(Error::ModelUnavailable(format!(
                "Failed to pull model '{}'. Check Ollama is running.",
                self.model
            )));
        }

        tracing::info!("Pulled embedding model '{}'", self.model);
        Ok(())
    }
}

impl EmbeddingProvider for OllamaEmbeddingClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = match self.ollama.list_local_models().await {
            Ok(models) => models,
            Err(error) => {
                return Err(Error::ModelUnavailable(format!(
                    "Failed to connect to Ollama: {error}.\n\nPlease ensure Ollama is installed and running:\n  - Install from: https://ollama.ai\n  - Start with: ollama serve"
                )));
            }
        };

        let model_available = models.iter().any(|model| model.name.contains(&self.model));
        if model_available {
            return Ok(());
        }

        if !self.pull_missing {
            return Err(Error::ModelUnavailable(format!(
                "Embedding model '{}' not found. Run: ollama pull {}",
                self.model, self.model
            )));
        }

        self.pull_model().await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::default());
        }

        let request = GenerateEmbeddingsRequest::new(self.model.clone(), texts.into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                let error_str = format!("{error:?}");
                if error_str.contains("model") && error_str.contains("not found") {
                    Error::ModelUnavailable(format!(
                        "Embedding model '{}' not found. Run: ollama pull {}",
                        self.model, self.model
                    ))
                } else {
                    Error::Embedding(format!("Batch embedding generation failed: {error}"))
                }
            })?;

        Ok(response.embeddings)
    }
}
