use std::str;

use studymate_core::{Document, DocumentExtractor, Error, Result};

/// Byte-order mark some editors prepend to UTF-8 files.
const UTF8_BOM: char = '\u{feff}';

/// Extractor for UTF-8 text documents.
///
/// Binary formats are rejected rather than decoded lossily, so a PDF fed in
/// by mistake is reported as a skipped document instead of indexing noise.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, document: &Document) -> Result<String> {
        if document.bytes.contains(&0) {
            return Err(Error::extraction(&document.name, "binary content is not supported"));
        }

        let text = str::from_utf8(&document.bytes)
            .map_err(|error| Error::extraction(&document.name, format!("invalid UTF-8: {error}")))?;

        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_owned())
    }
}
