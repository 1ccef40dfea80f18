//! Retrieval core: word-window chunking, embedding, nearest-neighbor indexing
//! and the pipeline that ties them together.
//!
//! ```text
//! Document → extractor → Chunker → Embedder → VectorIndex (build)
//! Question → Embedder → VectorIndex::search → nearest chunks (query)
//! ```
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

pub mod chunking;
pub mod embedding;
/// Plain-text document extraction.
pub mod extraction;
pub mod index;
pub mod pipeline;

pub use chunking::{ChunkBatch, Chunker};
pub use embedding::{Embedder, EmbeddingProvider, HashingEmbeddingClient, OllamaEmbeddingClient};
pub use extraction::PlainTextExtractor;
pub use index::{IndexSnapshot, SearchHit, VectorIndex};
pub use pipeline::{IngestOutcome, IngestStats, QueryOutcome, RetrievalPipeline};
