//! Overlapping word-window chunking of extracted document text.

use studymate_core::{
    Chunk, ChunkingConfig, Document, DocumentExtractor, Result, SkippedDocument,
};
use tracing::{debug, warn};

/// Chunks produced from one ingestion batch, plus the audit trail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkBatch {
    /// Chunks in document-then-position order, ids dense from 0
    pub chunks: Vec<Chunk>,
    /// Names of the documents whose text was extracted
    pub processed: Vec<String>,
    /// Documents dropped because extraction failed
    pub skipped: Vec<SkippedDocument>,
}

/// Splits text into fixed-size windows of words that overlap their predecessor.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    /// Words per window
    chunk_size: usize,
    /// Words shared with the previous window
    overlap: usize,
}

impl Chunker {
    /// Create a chunker from validated settings.
    ///
    /// # Errors
    /// Returns a configuration error if `overlap >= chunk_size` or `chunk_size == 0`.
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    /// Maximum number of words per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of words shared by consecutive chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Number of words the window advances between chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Chunk a single text. Ids start at 0.
    pub fn create_chunks(&self, text: &str, source: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        self.append_chunks(text, source, &mut chunks);
        chunks
    }

    /// Chunk already-extracted texts as one batch with continuous ids.
    pub fn chunk_texts<T, S>(&self, documents: &[(T, S)]) -> ChunkBatch
    where
        T: AsRef<str>,
        S: AsRef<str>,
    {
        let mut batch = ChunkBatch::default();
        for (text, source) in documents {
            let produced = self.append_chunks(text.as_ref(), source.as_ref(), &mut batch.chunks);
            debug!("Chunked {} into {produced} chunks", source.as_ref());
            batch.processed.push(source.as_ref().to_owned());
        }
        batch
    }

    /// Extract and chunk every document, skipping the ones that fail.
    ///
    /// A failed extraction never aborts the batch; it is logged and recorded
    /// in [`ChunkBatch::skipped`].
    pub fn process_batch<X>(&self, documents: &[Document], extractor: &X) -> ChunkBatch
    where
        X: DocumentExtractor + ?Sized,
    {
        let mut batch = ChunkBatch::default();
        for document in documents {
            match extractor.extract(document) {
                Ok(text) => {
                    let produced = self.append_chunks(&text, &document.name, &mut batch.chunks);
                    debug!("Chunked {} into {produced} chunks", document.name);
                    batch.processed.push(document.name.clone());
                }
                Err(error) => {
                    warn!("Skipping {}: {error}", document.name);
                    batch.skipped.push(SkippedDocument {
                        source: document.name.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }
        batch
    }

    /// Append the windows of `text` to `chunks`, numbering from `chunks.len()`.
    ///
    /// The last window always ends on the last word; windowing stops there so
    /// no window is a suffix of its predecessor.
    fn append_chunks(&self, text: &str, source: &str, chunks: &mut Vec<Chunk>) -> usize {
        let words: Vec<&str> = text.split_whitespace().collect();
        let before = chunks.len();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            let chunk_id = chunks.len();
            chunks.push(Chunk::new(words[start..end].join(" "), source, chunk_id));
            if end == words.len() {
                break;
            }
            start += self.stride();
        }

        chunks.len() - before
    }
}
