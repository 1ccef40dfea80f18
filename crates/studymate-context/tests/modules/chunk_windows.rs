//! Integration tests for word-window chunking across batches.

#[cfg(test)]
mod tests {
    use studymate_context::{Chunker, PlainTextExtractor};
    use studymate_core::{ChunkingConfig, Document};

    fn words(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|index| format!("{prefix}{index}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn expected_count(word_count: usize, chunk_size: usize, overlap: usize) -> usize {
        let stride = chunk_size - overlap;
        word_count.saturating_sub(overlap).max(1).div_ceil(stride)
    }

    #[test]
    fn test_chunk_count_matches_formula_for_many_shapes() {
        for (chunk_size, overlap) in [(500, 100), (10, 3), (5, 0), (7, 6)] {
            let chunker = Chunker::new(&ChunkingConfig {
                chunk_size,
                overlap,
            })
            .expect("valid config");

            let shapes = [1, 2, chunk_size - 1, chunk_size, chunk_size + 1, 3 * chunk_size + 2];
            for word_count in shapes {
                let chunks = chunker.create_chunks(&words("w", word_count), "doc.txt");
                assert_eq!(
                    chunks.len(),
                    expected_count(word_count, chunk_size, overlap),
                    "chunk_size {chunk_size}, overlap {overlap}, {word_count} words"
                );
                assert!(chunks.iter().all(|chunk| chunk.word_count() <= chunk_size));
                assert!(chunks.iter().all(|chunk| !chunk.text.is_empty()));
            }
        }
    }

    #[test]
    fn test_first_and_last_words_are_covered() {
        let chunker = Chunker::new(&ChunkingConfig::default()).expect("default config");
        let text = words("token", 1_234);
        let chunks = chunker.create_chunks(&text, "long.txt");

        let first = chunks.first().expect("first chunk");
        let last = chunks.last().expect("last chunk");
        assert!(first.text.starts_with("token0 "));
        assert!(last.text.ends_with(" token1233"));
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_ids_are_dense_across_documents() {
        let chunker = Chunker::new(&ChunkingConfig {
            chunk_size: 4,
            overlap: 1,
        })
        .expect("valid config");
        let documents = vec![
            Document::from_text("a.txt", &words("a", 10)),
            Document::from_text("empty.txt", "  "),
            Document::from_text("b.txt", &words("b", 6)),
        ];

        let batch = chunker.process_batch(&documents, &PlainTextExtractor);
        let ids: Vec<usize> = batch.chunks.iter().map(|chunk| chunk.chunk_id).collect();
        assert_eq!(ids, (0..batch.chunks.len()).collect::<Vec<_>>());

        let first_b = batch
            .chunks
            .iter()
            .position(|chunk| chunk.source == "b.txt")
            .expect("chunks from b.txt");
        assert!(batch.chunks[..first_b].iter().all(|chunk| chunk.source == "a.txt"));
        assert_eq!(batch.processed, vec!["a.txt", "empty.txt", "b.txt"]);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_overlapping_words_are_shared() {
        let chunker = Chunker::new(&ChunkingConfig {
            chunk_size: 6,
            overlap: 2,
        })
        .expect("valid config");
        let chunks = chunker.create_chunks(&words("x", 14), "doc.txt");

        for pair in chunks.windows(2) {
            let previous: Vec<&str> = pair[0].text.split(' ').collect();
            let next: Vec<&str> = pair[1].text.split(' ').collect();
            assert_eq!(previous[previous.len() - 2..], next[..2]);
        }
    }
}
