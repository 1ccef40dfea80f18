//! Nearest-neighbor index over chunk embeddings.
//!
//! The searchable state is an immutable [`IndexSnapshot`] behind an `Arc`.
//! A rebuild embeds the whole batch first and then swaps the pointer, so a
//! concurrent reader sees either the old index or the new one, never a mix.

mod snapshot;

use std::mem::replace;
use std::sync::{Arc, RwLock};

use studymate_core::{Chunk, IgnoreRwLock as _, Result};
use tracing::{debug, info, warn};

use crate::embedding::{Embedder, EmbeddingProvider};

pub use snapshot::{IndexSnapshot, SearchHit, squared_euclidean};

/// Exact L2 index that embeds chunks and queries with one [`Embedder`].
pub struct VectorIndex<E: EmbeddingProvider> {
    embedder: Embedder<E>,
    current: RwLock<Arc<IndexSnapshot>>,
}

impl<E: EmbeddingProvider> VectorIndex<E> {
    /// Create an unbuilt index.
    pub fn new(embedder: Embedder<E>) -> Self {
        Self {
            embedder,
            current: RwLock::new(Arc::new(IndexSnapshot::empty())),
        }
    }

    /// The embedder shared by build and search.
    pub fn embedder(&self) -> &Embedder<E> {
        &self.embedder
    }

    /// Embed `chunks` and replace the current index with them.
    ///
    /// Returns the number of indexed chunks. An empty batch leaves the index
    /// unbuilt. If embedding fails the previous index stays in place.
    ///
    /// # Errors
    /// Returns an error if embedding fails or the vectors are malformed.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        info!("Embedding {} chunks with '{}'...", texts.len(), self.embedder.model_name());

        let embeddings = self.embedder.embed(&texts).await?;
        let snapshot = IndexSnapshot::from_embeddings(chunks, embeddings)?;
        let count = snapshot.len();

        let previous = self.install(snapshot);
        if count == 0 {
            warn!("Index is empty - nothing to search");
        } else {
            info!(
                "Indexed {count} chunks (dimension {}), replacing {} chunks",
                self.snapshot().dimension(),
                previous.len()
            );
        }
        Ok(count)
    }

    /// Atomically install `snapshot`, returning the one it replaced.
    pub fn install(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let next = Arc::new(snapshot);
        replace(&mut *self.current.write_ignore_poison(), next)
    }

    /// Drop the current index, returning to the unbuilt state.
    pub fn clear(&self) {
        let previous = self.install(IndexSnapshot::empty());
        debug!("Cleared index of {} chunks", previous.len());
    }

    /// The snapshot searches currently run against.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read_ignore_poison())
    }

    /// Whether any chunk is indexed.
    pub fn is_built(&self) -> bool {
        !self.snapshot().is_empty()
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the index is unbuilt.
    pub fn is_empty(&self) -> bool {
        !self.is_built()
    }

    /// The `k` chunks nearest to `query`, nearest first.
    ///
    /// An unbuilt index, or `k == 0`, yields no hits without calling the model.
    ///
    /// # Errors
    /// Returns an error if the query cannot be embedded.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.search_snapshot(&self.snapshot(), query, k).await
    }

    /// [`Self::search`] against a snapshot taken earlier, unaffected by any
    /// rebuild since.
    ///
    /// # Errors
    /// Returns an error if the query cannot be embedded.
    pub async fn search_snapshot(
        &self,
        snapshot: &IndexSnapshot,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        if snapshot.is_empty() || k == 0 {
            debug!("Search skipped: {} chunks indexed, k = {k}", snapshot.len());
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query).await?;
        let hits = snapshot.nearest(&query_vector, k)?;
        debug!("Search returned {} of {} chunks", hits.len(), snapshot.len());
        Ok(hits)
    }
}
