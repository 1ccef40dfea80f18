//! Core types and traits for the `StudyMate` retrieval workspace.
//!
//! This crate provides the shared error type, configuration, chunk and document
//! records, and the traits implemented by external collaborators (document
//! extractors and text generators).
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

/// Configuration types and loading.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Lock helpers that ignore poisoning.
pub mod sync;
/// Trait definitions for external collaborators.
pub mod traits;
/// Core data types for documents and chunks.
pub mod types;

pub use config::{
    ChunkingConfig, EmbeddingConfig, GenerationBackend, GenerationConfig, RetrievalConfig,
    StudyConfig,
};
pub use error::{Error, Result};
pub use sync::{IgnoreLock, IgnoreRwLock};
pub use traits::{DocumentExtractor, TextGenerator};
pub use types::{Chunk, Document, SkippedDocument};
