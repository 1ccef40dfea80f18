use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A unit of retrievable text cut from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Words of the window joined by single spaces.
    pub text: String,
    /// Name of the originating document.
    pub source: String,
    /// Position of the chunk within its ingestion batch (0-based, dense).
    pub chunk_id: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(text: String, source: impl Into<String>, chunk_id: usize) -> Self {
        Self {
            text,
            source: source.into(),
            chunk_id,
        }
    }

    /// Number of whitespace-separated words in the chunk.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// The first `max_chars` characters of the text, suffixed with `...` when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() > max_chars {
            let truncated: String = self.text.chars().take(max_chars).collect();
            format!("{truncated}...")
        } else {
            self.text.clone()
        }
    }
}

/// A raw document awaiting text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Display name, usually the file name.
    pub name: String,
    /// Undecoded document contents.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Create a document from raw bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Create a document from text that is already in memory.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.as_bytes().to_vec())
    }

    /// Read a document from disk, naming it after the file name.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |file_name| file_name.to_string_lossy().into_owned(),
        );
        Ok(Self::new(name, bytes))
    }
}

/// Audit record of a document that was dropped from an ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Name of the skipped document.
    pub source: String,
    /// Why the document was skipped.
    pub reason: String,
}
