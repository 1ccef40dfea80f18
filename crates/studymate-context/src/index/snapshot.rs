//! Immutable flat L2 index over one ingestion batch.

use std::cmp::Ordering;

use serde::Serialize;
use studymate_core::{Chunk, Error, Result};

use crate::embedding::Embedding;

/// A chunk returned by a nearest-neighbor search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// The matched chunk
    pub chunk: Chunk,
    /// Euclidean distance between the query and the chunk vector
    pub distance: f32,
}

/// Vectors and chunks of one batch; position `i` of each belongs together.
///
/// Vectors live in one contiguous `f32` buffer of `len() * dimension()`
/// components. The empty snapshot is the unbuilt index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSnapshot {
    dimension: usize,
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl IndexSnapshot {
    /// The unbuilt index.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair every chunk with its embedding.
    ///
    /// # Errors
    /// Returns [`Error::IndexBuild`] on a count mismatch, ragged or zero-width
    /// vectors, or non-finite components.
    pub fn from_embeddings(chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::IndexBuild(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let Some(dimension) = embeddings.first().map(Vec::len) else {
            return Ok(Self::empty());
        };
        if dimension == 0 {
            return Err(Error::IndexBuild("embeddings have zero dimension".to_owned()));
        }

        let mut vectors = Vec::with_capacity(dimension * embeddings.len());
        for (position, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(Error::IndexBuild(format!(
                    "embedding {position} has dimension {}, expected {dimension}",
                    embedding.len()
                )));
            }
            if embedding.iter().any(|value| !value.is_finite()) {
                return Err(Error::IndexBuild(format!(
                    "embedding {position} has non-finite components"
                )));
            }
            vectors.extend_from_slice(embedding);
        }

        Ok(Self {
            dimension,
            vectors,
            chunks,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the snapshot holds nothing (the unbuilt state).
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Width of the stored vectors, 0 when empty.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Indexed chunks in position order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Stored vector at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        self.vectors.get(start..start + self.dimension)
    }

    /// The `k` chunks nearest to `query`, nearest first.
    ///
    /// Ties are broken by ascending `chunk_id`. Returns fewer than `k` hits
    /// when fewer chunks are indexed, and nothing when the snapshot is empty.
    ///
    /// # Errors
    /// Returns [`Error::Embedding`] if the query width differs from the index
    /// or the query has non-finite components.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(Error::Embedding(format!(
                "query has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }
        if query.iter().any(|value| !value.is_finite()) {
            return Err(Error::Embedding("query has non-finite components".to_owned()));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|vector| squared_euclidean(query, vector))
            .enumerate()
            .collect();

        let order = |first: &(usize, f32), second: &(usize, f32)| -> Ordering {
            first.1.total_cmp(&second.1).then_with(|| {
                self.chunks[first.0]
                    .chunk_id
                    .cmp(&self.chunks[second.0].chunk_id)
                    .then(first.0.cmp(&second.0))
            })
        };

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(order);

        Ok(scored
            .into_iter()
            .map(|(position, squared)| SearchHit {
                chunk: self.chunks[position].clone(),
                distance: squared.sqrt(),
            })
            .collect())
    }
}

/// Squared Euclidean distance over the common prefix of both slices.
pub fn squared_euclidean(first: &[f32], second: &[f32]) -> f32 {
    first
        .iter()
        .zip(second)
        .map(|(left, right)| {
            let delta = left - right;
            delta * delta
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_id: usize) -> Chunk {
        Chunk::new(format!("chunk {chunk_id}"), "doc.txt", chunk_id)
    }

    fn snapshot(vectors: Vec<Vec<f32>>) -> IndexSnapshot {
        let chunks = (0..vectors.len()).map(chunk).collect();
        IndexSnapshot::from_embeddings(chunks, vectors).expect("valid snapshot")
    }

    fn ids(hits: &[SearchHit]) -> Vec<usize> {
        hits.iter().map(|hit| hit.chunk.chunk_id).collect()
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let index = snapshot(vec![
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![0.0, 0.5],
        ]);

        let hits = index.nearest(&[0.0, 0.0], 4).expect("search");
        assert_eq!(ids(&hits), vec![3, 1, 2, 0]);
        assert!((hits[0].distance - 0.5).abs() < f32::EPSILON);
        assert!((hits[2].distance - 3.0).abs() < f32::EPSILON);
        assert!(hits.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
    }

    #[test]
    fn test_exact_match_has_zero_distance() {
        let index = snapshot(vec![vec![0.2, 0.4, 0.1], vec![0.9, 0.1, 0.3]]);
        let hits = index.nearest(&[0.9, 0.1, 0.3], 1).expect("search");
        assert_eq!(ids(&hits), vec![1]);
        assert!(hits[0].distance.abs() < f32::EPSILON);
    }

    #[test]
    fn test_ties_break_by_chunk_id() {
        let index = snapshot(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.0, -1.0],
        ]);
        let hits = index.nearest(&[0.0, 0.0], 3).expect("search");
        assert_eq!(ids(&hits), vec![0, 1, 2]);
    }

    #[test]
    fn test_k_larger_than_index_returns_everything() {
        let index = snapshot(vec![vec![1.0], vec![2.0], vec![3.0]]);
        let hits = index.nearest(&[2.2], 10).expect("search");
        assert_eq!(ids(&hits), vec![1, 2, 0]);
    }

    #[test]
    fn test_top_k_subset_matches_full_ranking() {
        let vectors: Vec<Vec<f32>> = (0..50_u8)
            .map(|step| {
                let value = f32::from(step);
                vec![(value * 0.37).sin(), (value * 0.11).cos()]
            })
            .collect();
        let index = snapshot(vectors);
        let query = [0.3, -0.2];

        let full = index.nearest(&query, 50).expect("full search");
        let top = index.nearest(&query, 7).expect("top search");
        assert_eq!(top.len(), 7);
        assert_eq!(ids(&top), ids(&full[..7]));

        let mut unique = ids(&top);
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_empty_snapshot_and_zero_k() {
        let empty = IndexSnapshot::empty();
        assert!(empty.is_empty());
        assert!(empty.nearest(&[1.0, 2.0], 3).expect("search").is_empty());

        let index = snapshot(vec![vec![1.0, 2.0]]);
        assert!(index.nearest(&[1.0, 2.0], 0).expect("search").is_empty());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = snapshot(vec![vec![1.0, 2.0]]);
        assert!(matches!(index.nearest(&[1.0], 1), Err(Error::Embedding(_))));
        assert!(matches!(
            index.nearest(&[f32::NAN, 1.0], 1),
            Err(Error::Embedding(_))
        ));
    }

    #[test]
    fn test_build_rejects_malformed_embeddings() {
        let mismatch = IndexSnapshot::from_embeddings(vec![chunk(0)], vec![]);
        assert!(matches!(mismatch, Err(Error::IndexBuild(_))));

        let ragged = IndexSnapshot::from_embeddings(
            vec![chunk(0), chunk(1)],
            vec![vec![1.0, 2.0], vec![1.0]],
        );
        assert!(matches!(ragged, Err(Error::IndexBuild(_))));

        let zero_width = IndexSnapshot::from_embeddings(vec![chunk(0)], vec![vec![]]);
        assert!(matches!(zero_width, Err(Error::IndexBuild(_))));

        let infinite =
            IndexSnapshot::from_embeddings(vec![chunk(0)], vec![vec![f32::INFINITY]]);
        assert!(matches!(infinite, Err(Error::IndexBuild(_))));
    }

    #[test]
    fn test_vectors_are_stored_by_position() {
        let index = snapshot(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(index.dimension(), 2);
        assert_eq!(index.vector(1), Some(&[3.0, 4.0][..]));
        assert_eq!(index.vector(2), None);
        assert_eq!(index.chunks().len(), index.len());
    }
}
