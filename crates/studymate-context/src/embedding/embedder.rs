//! Embedder wrapper enforcing the one-vector-per-text, fixed-dimension contract.

use std::sync::OnceLock;

use studymate_core::{EmbeddingConfig, Error, Result};
use tracing::{debug, info};

use super::client::{Embedding, EmbeddingProvider};

/// Wraps an [`EmbeddingProvider`] chosen at construction time.
///
/// The first vector seen fixes the dimension for the lifetime of the
/// embedder; later vectors of another width are rejected.
pub struct Embedder<E: EmbeddingProvider> {
    provider: E,
    batch_size: usize,
    dimension: OnceLock<usize>,
}

impl<E: EmbeddingProvider> Embedder<E> {
    /// Load the model behind `provider`.
    ///
    /// # Errors
    /// Returns [`Error::ModelUnavailable`] if the model cannot be loaded, or a
    /// configuration error if `batch_size` is zero.
    pub async fn load(provider: E, config: &EmbeddingConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::Config("embedding.batch_size must be positive".to_owned()));
        }

        info!("Checking embedding model '{}'...", provider.model_name());
        provider
            .ensure_model_available()
            .await
            .map_err(|error| match error {
                Error::ModelUnavailable(_) => error,
                other => Error::ModelUnavailable(format!("{}: {other}", provider.model_name())),
            })?;

        Ok(Self {
            provider,
            batch_size: config.batch_size,
            dimension: OnceLock::new(),
        })
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Vector width, once at least one vector has been produced.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension.get().copied()
    }

    /// Embed `texts` in order, one vector each.
    ///
    /// # Errors
    /// Returns an error if the provider fails, returns the wrong number of
    /// vectors, or returns vectors of an unexpected width.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embedded = self.provider.embed_batch(batch.to_vec()).await?;
            if embedded.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "model '{}' returned {} vectors for {} texts",
                    self.model_name(),
                    embedded.len(),
                    batch.len()
                )));
            }
            for vector in &embedded {
                self.check_dimension(vector.len())?;
            }
            vectors.extend(embedded);
            debug!("Embedded {}/{} texts", vectors.len(), texts.len());
        }

        Ok(vectors)
    }

    /// Embed a single query text.
    ///
    /// # Errors
    /// Returns an error under the same conditions as [`Self::embed`].
    pub async fn embed_query(&self, text: &str) -> Result<Embedding> {
        self.embed(&[text.to_owned()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned for query".to_owned()))
    }

    fn check_dimension(&self, width: usize) -> Result<()> {
        if width == 0 {
            return Err(Error::Embedding(format!(
                "model '{}' returned an empty vector",
                self.model_name()
            )));
        }
        let expected = *self.dimension.get_or_init(|| width);
        if expected != width {
            return Err(Error::Embedding(format!(
                "model '{}' changed dimension from {expected} to {width}",
                self.model_name()
            )));
        }
        Ok(())
    }
}
