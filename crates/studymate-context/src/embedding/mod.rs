//! Sentence embedding: provider clients and the dimension-checking wrapper.

mod client;
mod embedder;
mod hashing;

pub use client::{Embedding, EmbeddingProvider, OllamaEmbeddingClient};
pub use embedder::Embedder;
pub use hashing::HashingEmbeddingClient;
