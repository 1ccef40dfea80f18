//! Integration tests for ingestion and query through the retrieval pipeline.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use studymate_context::{
        HashingEmbeddingClient, IngestOutcome, PlainTextExtractor, QueryOutcome, RetrievalPipeline,
        SearchHit,
    };
    use studymate_core::{ChunkingConfig, Document, StudyConfig};
    use tempfile::TempDir;

    const BIOLOGY: &str = "Photosynthesis takes place in the chloroplast. Chlorophyll \
        absorbs sunlight and the plant converts carbon dioxide and water into glucose \
        and oxygen. The light reactions happen in the thylakoid membrane.";
    const HISTORY: &str = "The Treaty of Westphalia ended the Thirty Years War in 1648. \
        Diplomats from many European kingdoms negotiated in Osnabruck and Munster, \
        establishing principles of state sovereignty.";

    const CARBON_FIXATION: &str = "\
        Photosynthesis converts sunlight into chemical energy inside chloroplasts \
        where chlorophyll pigments capture photons while thylakoid membranes pump \
        protons so ATP synthase phosphorylates ADP producing carriers that drive \
        Calvin cycle enzymes like rubisco fixing atmospheric carbon dioxide into \
        sugars which plants store as starch or ship through phloem toward roots later";
    const THIRTY_YEARS_WAR: &str = "\
        Medieval European monarchs negotiated treaties after decades of warfare \
        between rival dynasties whose armies marched over Flanders Bohemia Saxony \
        Bavaria sieging fortified towns diplomats gathered at Westphalia in 1648 \
        signing agreements recognizing sovereignty religious tolerance territorial \
        borders Habsburg ambitions faded Swedish forces withdrew northward French \
        cardinals gained influence mercenaries returned";

    fn vocabulary(text: &str) -> HashSet<String> {
        text.split(|character: char| !character.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn config(chunk_size: usize, overlap: usize) -> StudyConfig {
        StudyConfig {
            chunking: ChunkingConfig {
                chunk_size,
                overlap,
            },
            ..StudyConfig::default()
        }
    }

    async fn hashing_pipeline(config: &StudyConfig) -> RetrievalPipeline<HashingEmbeddingClient> {
        RetrievalPipeline::new(config, HashingEmbeddingClient::default(), PlainTextExtractor)
            .await
            .expect("pipeline")
    }

    fn matches(outcome: QueryOutcome) -> Vec<SearchHit> {
        match outcome {
            QueryOutcome::Matches(hits) => hits,
            QueryOutcome::IndexNotBuilt => panic!("index should be built"),
        }
    }

    #[tokio::test]
    async fn test_disjoint_documents_retrieve_their_own_chunks() {
        let pipeline = hashing_pipeline(&StudyConfig::default()).await;
        pipeline
            .ingest(&[
                Document::from_text("biology.txt", BIOLOGY),
                Document::from_text("history.txt", HISTORY),
            ])
            .await
            .expect("ingest");

        let biology = matches(
            pipeline
                .answer_query("what does chlorophyll absorb in the chloroplast", 1)
                .await
                .expect("query"),
        );
        assert_eq!(biology[0].chunk.source, "biology.txt");

        let history = matches(
            pipeline
                .answer_query("which treaty ended the thirty years war", 1)
                .await
                .expect("query"),
        );
        assert_eq!(history[0].chunk.source, "history.txt");
    }

    #[tokio::test]
    async fn test_verbatim_passage_ranks_its_document_first() {
        assert_eq!(CARBON_FIXATION.split_whitespace().count(), 50);
        assert_eq!(THIRTY_YEARS_WAR.split_whitespace().count(), 50);
        assert!(vocabulary(CARBON_FIXATION).is_disjoint(&vocabulary(THIRTY_YEARS_WAR)));

        let pipeline = hashing_pipeline(&StudyConfig::default()).await;
        let outcome = pipeline
            .ingest(&[
                Document::from_text("carbon.txt", CARBON_FIXATION),
                Document::from_text("war.txt", THIRTY_YEARS_WAR),
            ])
            .await
            .expect("ingest");
        assert_eq!(outcome.stats().document_count, 2);
        assert_eq!(outcome.stats().chunk_count, 2);

        let passage = CARBON_FIXATION
            .split_whitespace()
            .skip(10)
            .take(12)
            .collect::<Vec<_>>()
            .join(" ");
        let hits = matches(pipeline.answer_query(&passage, 2).await.expect("query"));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.source, "carbon.txt");
        assert_eq!(hits[1].chunk.source, "war.txt");
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn test_one_corrupt_document_is_skipped() {
        let pipeline = hashing_pipeline(&config(12, 3)).await;
        let documents = vec![
            Document::from_text("biology.txt", BIOLOGY),
            Document::new("scan.pdf", b"%PDF-1.4\0\xff\xfe binary".to_vec()),
            Document::from_text("history.txt", HISTORY),
            Document::from_text("notes.txt", "Mitochondria are the powerhouse of the cell."),
        ];

        let outcome = pipeline.ingest(&documents).await.expect("ingest");
        let stats = outcome.stats();
        assert!(outcome.is_indexed());
        assert_eq!(stats.document_count, 3);
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.skipped[0].source, "scan.pdf");
        assert!(
            pipeline
                .index()
                .snapshot()
                .chunks()
                .iter()
                .all(|chunk| chunk.source != "scan.pdf")
        );
    }

    #[tokio::test]
    async fn test_rebuild_with_same_batch_is_idempotent() {
        let pipeline = hashing_pipeline(&config(10, 2)).await;
        let documents = vec![
            Document::from_text("biology.txt", BIOLOGY),
            Document::from_text("history.txt", HISTORY),
        ];

        pipeline.ingest(&documents).await.expect("first ingest");
        let first_len = pipeline.index().len();
        let first = matches(pipeline.answer_query("glucose and oxygen", 4).await.expect("query"));

        pipeline.ingest(&documents).await.expect("second ingest");
        let second = matches(pipeline.answer_query("glucose and oxygen", 4).await.expect("query"));

        assert_eq!(pipeline.index().len(), first_len);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_ingestion_leaves_nothing_to_search() {
        let pipeline = hashing_pipeline(&StudyConfig::default()).await;
        let outcome = pipeline.ingest(&[]).await.expect("ingest");

        assert!(matches!(outcome, IngestOutcome::NothingToIndex(_)));
        assert_eq!(outcome.stats().chunk_count, 0);
        assert_eq!(
            pipeline.answer_query("anything", 3).await.expect("query"),
            QueryOutcome::IndexNotBuilt
        );
        assert!(pipeline.index().search("anything", 3).await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn test_hits_are_unique_sorted_and_bounded() {
        let pipeline = hashing_pipeline(&config(6, 2)).await;
        pipeline
            .ingest_texts(&[
                (BIOLOGY.to_owned(), "biology.txt".to_owned()),
                (HISTORY.to_owned(), "history.txt".to_owned()),
            ])
            .await
            .expect("ingest");
        let total = pipeline.index().len();

        for k in [1, 3, total, total + 5] {
            let outcome = pipeline
                .answer_query("the plant and the kingdoms", k)
                .await
                .expect("query");
            let hits = matches(outcome);
            assert_eq!(hits.len(), k.min(total));
            assert!(hits.windows(2).all(|pair| pair[0].distance <= pair[1].distance));

            let mut ids: Vec<usize> = hits.iter().map(|hit| hit.chunk.chunk_id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), hits.len());
        }
    }

    #[tokio::test]
    async fn test_documents_loaded_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let biology_path = dir.path().join("biology.txt");
        let history_path = dir.path().join("history.txt");
        fs::write(&biology_path, BIOLOGY).expect("write biology");
        fs::write(&history_path, HISTORY).expect("write history");

        let documents = vec![
            Document::from_path(&biology_path).expect("load biology"),
            Document::from_path(&history_path).expect("load history"),
        ];
        let pipeline = hashing_pipeline(&config(20, 5)).await;
        pipeline.ingest(&documents).await.expect("ingest");

        let hits = matches(pipeline.retrieve("Westphalia sovereignty").await.expect("query"));
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk.source, "history.txt");
    }
}
