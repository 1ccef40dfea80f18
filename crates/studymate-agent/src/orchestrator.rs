use std::sync::Arc;

use serde::Serialize;
use studymate_context::SearchHit;
use studymate_core::{Result, TextGenerator};
use tracing::{debug, info};

use crate::prompt::build_prompt;

/// Characters of chunk text shown with each reference.
pub const EXCERPT_CHARS: usize = 500;

/// A chunk cited by an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    /// Document the chunk came from
    pub source: String,
    /// Id of the chunk within its ingestion batch
    pub chunk_id: usize,
    /// L2 distance between question and chunk
    pub distance: f32,
    /// Leading part of the chunk text
    pub excerpt: String,
}

impl From<&SearchHit> for Reference {
    fn from(hit: &SearchHit) -> Self {
        Self {
            source: hit.chunk.source.clone(),
            chunk_id: hit.chunk.chunk_id,
            distance: hit.distance,
            excerpt: hit.chunk.preview(EXCERPT_CHARS),
        }
    }
}

/// A generated answer and the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// The question as asked
    pub question: String,
    /// Generated answer, surrounding whitespace removed
    pub text: String,
    /// Chunks given to the generator, nearest first
    pub references: Vec<Reference>,
}

/// Turns a question and its nearest chunks into a grounded answer.
pub struct AnswerOrchestrator {
    generator: Arc<dyn TextGenerator>,
}

impl AnswerOrchestrator {
    /// Create an orchestrator around `generator`.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// The generator answering questions.
    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    /// Generate an answer to `question` grounded on `hits`.
    ///
    /// # Errors
    /// Returns the generator's error if generation fails.
    pub async fn answer(&self, question: &str, hits: &[SearchHit]) -> Result<Answer> {
        let prompt = build_prompt(question, hits);
        debug!(
            "Prompt for {} has {} characters from {} chunks",
            self.generator.name(),
            prompt.len(),
            hits.len()
        );

        let generated = self.generator.generate(&prompt).await?;
        let text = generated.trim().to_owned();
        info!("Generated answer of {} characters", text.len());

        Ok(Answer {
            question: question.to_owned(),
            text,
            references: hits.iter().map(Reference::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studymate_core::{Chunk, Error};
    use studymate_providers::MockGenerator;

    fn hit(text: String, source: &str, chunk_id: usize, distance: f32) -> SearchHit {
        SearchHit {
            chunk: Chunk::new(text, source, chunk_id),
            distance,
        }
    }

    #[tokio::test]
    async fn test_answer_is_trimmed_and_cites_hits() {
        let generator =
            MockGenerator::new().with_response("Question: What is DNA?", "  \nA double helix.\n ");
        let orchestrator = AnswerOrchestrator::new(Arc::new(generator.clone()));
        let hits = vec![
            hit("DNA is a double helix.".to_owned(), "bio.txt", 2, 0.25),
            hit("RNA is single stranded.".to_owned(), "bio.txt", 3, 0.75),
        ];

        let answer = orchestrator.answer("What is DNA?", &hits).await.expect("answer");
        assert_eq!(answer.text, "A double helix.");
        assert_eq!(answer.question, "What is DNA?");
        assert_eq!(answer.references.len(), 2);
        assert_eq!(answer.references[0].chunk_id, 2);
        assert_eq!(answer.references[1].excerpt, "RNA is single stranded.");

        let prompts = generator.get_call_history();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("DNA is a double helix.\n\nRNA is single stranded."));
    }

    #[tokio::test]
    async fn test_long_chunks_are_excerpted() {
        let orchestrator = AnswerOrchestrator::new(Arc::new(MockGenerator::new()));
        let long_text = "word ".repeat(200);
        let answer = orchestrator
            .answer("q", &[hit(long_text, "long.txt", 0, 1.0)])
            .await
            .expect("answer");

        let excerpt = &answer.references[0].excerpt;
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let generator = MockGenerator::new().failing("timeout");
        let orchestrator = AnswerOrchestrator::new(Arc::new(generator));
        let result = orchestrator.answer("q", &[]).await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }
}
