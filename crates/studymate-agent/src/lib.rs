//! Question answering over retrieved chunks.
//!
//! - [`prompt`]: grounded prompt construction
//! - [`orchestrator`]: prompt, generation and references for one question
//! - [`session`]: a retrieval pipeline and an orchestrator used together
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

/// Answer generation from search hits
pub mod orchestrator;
/// Prompt template
pub mod prompt;
/// Ingest-and-ask session
pub mod session;

pub use orchestrator::{Answer, AnswerOrchestrator, Reference};
pub use prompt::build_prompt;
pub use session::{AskOutcome, StudySession};
