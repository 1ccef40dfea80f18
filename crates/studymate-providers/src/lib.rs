//! Text-generation backends for answering questions over retrieved context.
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

use std::sync::Arc;

use studymate_core::{GenerationBackend, GenerationConfig, Result, TextGenerator};
use tracing::info;

/// `OpenAI`-compatible chat completions backend.
pub mod chat_completions;
/// Canned-response generator for tests and offline runs.
pub mod mock;
/// Local Ollama backend.
pub mod ollama;

pub use chat_completions::ChatCompletionsGenerator;
pub use mock::MockGenerator;
pub use ollama::OllamaGenerator;

/// Create the generator selected by `config.backend`.
///
/// # Errors
/// Returns an error if the chat completions backend is selected and its API
/// key is not set.
pub fn generator_from_config(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.backend {
        GenerationBackend::Ollama => Arc::new(OllamaGenerator::new(config)),
        GenerationBackend::ChatCompletions => Arc::new(ChatCompletionsGenerator::from_config(config)?),
    };
    info!("Using {} generator with model '{}'", generator.name(), config.model);
    Ok(generator)
}
