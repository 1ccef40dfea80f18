//! Offline feature-hashing embedder.
//!
//! Maps each lowercased alphanumeric token to a signed bucket with FNV-1a and
//! L2-normalizes the counts. Texts sharing vocabulary land close together,
//! which is enough for offline runs and deterministic tests; it has no notion
//! of synonyms.

use studymate_core::{Error, Result};

use super::client::{Embedding, EmbeddingProvider};

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
/// Default vector width, matching small sentence-embedding models.
const DEFAULT_DIMENSION: usize = 384;

/// Deterministic bag-of-words embedding provider that needs no model server.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbeddingClient {
    dimension: usize,
}

impl HashingEmbeddingClient {
    /// Create a provider producing vectors of `dimension` components.
    ///
    /// # Errors
    /// Returns a configuration error if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Config(
                "hashing embedder dimension must be positive".to_owned(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Width of the produced vectors.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed one text. Text without any token maps to the zero vector.
    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut accumulator = vec![0.0_f64; self.dimension];

        for token in text
            .split(|character: char| !character.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            accumulator[bucket] += sign;
        }

        let norm = accumulator.iter().map(|value| value * value).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut accumulator {
                *value /= norm;
            }
        }

        // Stored vectors and query vectors both pass through this cast.
        accumulator.into_iter().map(|value| value as f32).collect()
    }
}

impl Default for HashingEmbeddingClient {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingProvider for HashingEmbeddingClient {
    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// 64-bit FNV-1a over the UTF-8 bytes of `token`.
fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
