use studymate_context::{
    EmbeddingProvider, IngestOutcome, OllamaEmbeddingClient, PlainTextExtractor, QueryOutcome,
    RetrievalPipeline,
};
use studymate_core::{Document, DocumentExtractor, Error, Result, StudyConfig};
use studymate_providers::generator_from_config;
use tracing::{info, warn};

use crate::orchestrator::{Answer, AnswerOrchestrator};

/// Result of asking a question.
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    /// The generator answered from the nearest chunks
    Answered(Answer),
    /// The index holds chunks but none were retrieved
    NoRelevantChunks,
    /// Nothing has been ingested yet
    IndexNotBuilt,
}

/// A retrieval pipeline paired with an answer orchestrator.
pub struct StudySession<E: EmbeddingProvider, X: DocumentExtractor = PlainTextExtractor> {
    pipeline: RetrievalPipeline<E, X>,
    orchestrator: AnswerOrchestrator,
}

impl StudySession<OllamaEmbeddingClient> {
    /// Session using the configured Ollama embedding model and generator.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the embedding model is
    /// unavailable, or the generator cannot be created.
    pub async fn from_config(config: &StudyConfig) -> Result<Self> {
        let generator = generator_from_config(&config.generation)?;
        let pipeline = RetrievalPipeline::from_config(config).await?;
        Ok(Self::new(pipeline, AnswerOrchestrator::new(generator)))
    }
}

impl<E: EmbeddingProvider, X: DocumentExtractor> StudySession<E, X> {
    /// Pair `pipeline` with `orchestrator`.
    pub fn new(pipeline: RetrievalPipeline<E, X>, orchestrator: AnswerOrchestrator) -> Self {
        Self {
            pipeline,
            orchestrator,
        }
    }

    /// The retrieval pipeline.
    pub fn pipeline(&self) -> &RetrievalPipeline<E, X> {
        &self.pipeline
    }

    /// The answer orchestrator.
    pub fn orchestrator(&self) -> &AnswerOrchestrator {
        &self.orchestrator
    }

    /// Replace the indexed material with `documents`.
    ///
    /// # Errors
    /// Returns an error if embedding fails.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestOutcome> {
        self.pipeline.ingest(documents).await
    }

    /// Answer `question` from the configured number of nearest chunks.
    ///
    /// # Errors
    /// Returns an error if the question is blank, or if embedding or
    /// generation fails.
    pub async fn ask(&self, question: &str) -> Result<AskOutcome> {
        self.ask_with_k(question, self.pipeline.top_k()).await
    }

    /// Answer `question` from the `k` nearest chunks.
    ///
    /// # Errors
    /// Returns an error if the question is blank, or if embedding or
    /// generation fails.
    pub async fn ask_with_k(&self, question: &str, k: usize) -> Result<AskOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Other("Question must not be empty".to_owned()));
        }

        let hits = match self.pipeline.answer_query(question, k).await? {
            QueryOutcome::IndexNotBuilt => {
                warn!("Question asked before any document was indexed");
                return Ok(AskOutcome::IndexNotBuilt);
            }
            QueryOutcome::Matches(hits) if hits.is_empty() => {
                warn!("No relevant information found for question");
                return Ok(AskOutcome::NoRelevantChunks);
            }
            QueryOutcome::Matches(hits) => hits,
        };

        info!("Answering from {} chunks", hits.len());
        let answer = self.orchestrator.answer(question, &hits).await?;
        Ok(AskOutcome::Answered(answer))
    }
}
