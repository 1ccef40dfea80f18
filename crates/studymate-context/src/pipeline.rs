//! Ingestion and query entry points over one chunker, embedder and index.

use serde::Serialize;
use studymate_core::{Document, DocumentExtractor, Result, SkippedDocument, StudyConfig};
use tracing::{info, warn};

use crate::chunking::{ChunkBatch, Chunker};
use crate::embedding::{Embedder, EmbeddingProvider, OllamaEmbeddingClient};
use crate::extraction::PlainTextExtractor;
use crate::index::{SearchHit, VectorIndex};

/// Counts reported after an ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Documents whose text was extracted
    pub document_count: usize,
    /// Chunks now in the index
    pub chunk_count: usize,
    /// Documents dropped during extraction
    pub skipped: Vec<SkippedDocument>,
}

/// Result of an ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The index was rebuilt from the batch
    Indexed(IngestStats),
    /// The batch produced no chunks; the index is now unbuilt
    NothingToIndex(IngestStats),
}

impl IngestOutcome {
    /// Statistics of the ingestion, whatever its outcome.
    pub fn stats(&self) -> &IngestStats {
        match self {
            Self::Indexed(stats) | Self::NothingToIndex(stats) => stats,
        }
    }

    /// Whether the index holds chunks after this ingestion.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }
}

/// Result of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Nearest chunks, nearest first; empty only when `k` was 0
    Matches(Vec<SearchHit>),
    /// Nothing has been ingested yet
    IndexNotBuilt,
}

/// Retrieval pipeline: documents in, nearest chunks out.
///
/// Each ingestion replaces the whole index. Queries see either the previous
/// index or the new one, never a partially built one.
pub struct RetrievalPipeline<E: EmbeddingProvider, X: DocumentExtractor = PlainTextExtractor> {
    chunker: Chunker,
    index: VectorIndex<E>,
    extractor: X,
    top_k: usize,
}

impl RetrievalPipeline<OllamaEmbeddingClient> {
    /// Pipeline backed by the configured Ollama embedding model and the
    /// plain-text extractor.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the embedding
    /// model is unavailable.
    pub async fn from_config(config: &StudyConfig) -> Result<Self> {
        let provider = OllamaEmbeddingClient::new(&config.embedding)?;
        Self::new(config, provider, PlainTextExtractor).await
    }
}

impl<E: EmbeddingProvider, X: DocumentExtractor> RetrievalPipeline<E, X> {
    /// Build a pipeline from explicit collaborators.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the embedding
    /// model cannot be loaded.
    pub async fn new(config: &StudyConfig, provider: E, extractor: X) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::new(&config.chunking)?;
        let embedder = Embedder::load(provider, &config.embedding).await?;

        info!(
            "Retrieval pipeline ready: model '{}', chunk_size {}, overlap {}, top_k {}",
            embedder.model_name(),
            chunker.chunk_size(),
            chunker.overlap(),
            config.retrieval.top_k
        );

        Ok(Self {
            chunker,
            index: VectorIndex::new(embedder),
            extractor,
            top_k: config.retrieval.top_k,
        })
    }

    /// The index queries run against.
    pub fn index(&self) -> &VectorIndex<E> {
        &self.index
    }

    /// The chunker used for ingestion.
    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Number of hits [`Self::retrieve`] asks for.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Extract, chunk and index `documents`, replacing the current index.
    ///
    /// Documents that fail extraction are skipped and reported in the stats.
    ///
    /// # Errors
    /// Returns an error if embedding fails; the previous index is then kept.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestOutcome> {
        info!("Ingesting {} documents", documents.len());
        let batch = self.chunker.process_batch(documents, &self.extractor);
        self.index_batch(batch).await
    }

    /// Chunk and index already-extracted `(text, source)` pairs.
    ///
    /// # Errors
    /// Returns an error if embedding fails; the previous index is then kept.
    pub async fn ingest_texts(&self, texts: &[(String, String)]) -> Result<IngestOutcome> {
        info!("Ingesting {} texts", texts.len());
        let batch = self.chunker.chunk_texts(texts);
        self.index_batch(batch).await
    }

    /// The `k` chunks nearest to `question`.
    ///
    /// # Errors
    /// Returns an error if the question cannot be embedded.
    pub async fn answer_query(&self, question: &str, k: usize) -> Result<QueryOutcome> {
        let snapshot = self.index.snapshot();
        if snapshot.is_empty() {
            return Ok(QueryOutcome::IndexNotBuilt);
        }
        let hits = self.index.search_snapshot(&snapshot, question, k).await?;
        Ok(QueryOutcome::Matches(hits))
    }

    /// [`Self::answer_query`] with the configured `top_k`.
    ///
    /// # Errors
    /// Returns an error if the question cannot be embedded.
    pub async fn retrieve(&self, question: &str) -> Result<QueryOutcome> {
        self.answer_query(question, self.top_k).await
    }

    async fn index_batch(&self, batch: ChunkBatch) -> Result<IngestOutcome> {
        for skipped in &batch.skipped {
            warn!("Skipped {}: {}", skipped.source, skipped.reason);
        }

        let document_count = batch.processed.len();
        let chunk_count = self.index.build(batch.chunks).await?;
        let stats = IngestStats {
            document_count,
            chunk_count,
            skipped: batch.skipped,
        };

        if chunk_count == 0 {
            warn!("No text found in {document_count} documents - nothing to index");
            return Ok(IngestOutcome::NothingToIndex(stats));
        }
        info!(
            "Ingested {document_count} documents into {chunk_count} chunks ({} skipped)",
            stats.skipped.len()
        );
        Ok(IngestOutcome::Indexed(stats))
    }
}
