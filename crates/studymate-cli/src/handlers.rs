use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, ensure};
use serde_json::to_string_pretty;
use studymate_agent::{Answer, AskOutcome, StudySession};
use studymate_context::{IngestOutcome, QueryOutcome, RetrievalPipeline, SearchHit};
use studymate_core::{Document, SkippedDocument, StudyConfig};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};

/// Characters of chunk text shown per search hit.
const HIT_PREVIEW_CHARS: usize = 200;
/// Printed when no document yielded any text.
const NOTHING_INDEXED: &str = "No text could be extracted from the documents.";

/// Run the parsed command.
///
/// # Errors
/// Returns an error if configuration, ingestion, retrieval or generation fails.
pub async fn run(cli: Cli) -> Result<()> {
    let mut stdout = io::stdout();
    match cli.command {
        Commands::Init { force } => handle_init(cli.config, force, &mut stdout),
        Commands::Search {
            files,
            query,
            top_k,
            json,
        } => {
            let config = StudyConfig::load_or_default(cli.config.as_deref())?;
            handle_search(&config, &files, &query, top_k, json, &mut stdout).await
        }
        Commands::Ask {
            files,
            question,
            top_k,
            json,
        } => {
            let config = StudyConfig::load_or_default(cli.config.as_deref())?;
            handle_ask(&config, &files, &question, top_k, json, &mut stdout).await
        }
    }
}

/// Write the default configuration to `path`, or the default location.
///
/// # Errors
/// Returns an error if the file exists without `force` or cannot be written.
pub fn handle_init<W: Write>(path: Option<PathBuf>, force: bool, out: &mut W) -> Result<()> {
    let path = match path {
        Some(explicit) => explicit,
        None => StudyConfig::config_path()?,
    };
    ensure!(
        force || !path.exists(),
        "{} already exists (use --force to overwrite)",
        path.display()
    );

    StudyConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "Wrote default configuration to {}", path.display())?;
    Ok(())
}

async fn handle_search<W: Write + Send>(
    config: &StudyConfig,
    files: &[PathBuf],
    query: &str,
    top_k: Option<usize>,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let k = resolve_top_k(config, top_k)?;
    let (documents, unreadable) = load_documents(files);

    let pipeline = RetrievalPipeline::from_config(config).await?;
    let outcome = pipeline.ingest(&documents).await?;
    write_ingest_report(out, &outcome, &unreadable)?;

    match pipeline.answer_query(query, k).await? {
        QueryOutcome::IndexNotBuilt => writeln!(out, "{NOTHING_INDEXED}")?,
        QueryOutcome::Matches(hits) if json => writeln!(out, "{}", to_string_pretty(&hits)?)?,
        QueryOutcome::Matches(hits) => write_hits(out, &hits)?,
    }
    Ok(())
}

async fn handle_ask<W: Write + Send>(
    config: &StudyConfig,
    files: &[PathBuf],
    question: &str,
    top_k: Option<usize>,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let k = resolve_top_k(config, top_k)?;
    let (documents, unreadable) = load_documents(files);

    let session = StudySession::from_config(config).await?;
    let outcome = session.ingest(&documents).await?;
    write_ingest_report(out, &outcome, &unreadable)?;

    match session.ask_with_k(question, k).await? {
        AskOutcome::IndexNotBuilt => writeln!(out, "{NOTHING_INDEXED}")?,
        AskOutcome::NoRelevantChunks => {
            writeln!(out, "No relevant information found in the uploaded documents.")?;
        }
        AskOutcome::Answered(answer) if json => writeln!(out, "{}", to_string_pretty(&answer)?)?,
        AskOutcome::Answered(answer) => write_answer(out, &answer)?,
    }
    Ok(())
}

/// Pick the command-line `top_k` over the configured one.
///
/// # Errors
/// Returns an error if the command-line value is zero.
pub fn resolve_top_k(config: &StudyConfig, top_k: Option<usize>) -> Result<usize> {
    let k = top_k.unwrap_or(config.retrieval.top_k);
    ensure!(k > 0, "--top-k must be at least 1");
    Ok(k)
}

/// Read every file into a [`Document`], recording the ones that fail.
pub fn load_documents(files: &[PathBuf]) -> (Vec<Document>, Vec<SkippedDocument>) {
    let mut documents = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();

    for path in files {
        match Document::from_path(path) {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!("Skipping {}: {error}", path.display());
                unreadable.push(SkippedDocument {
                    source: display_name(path),
                    reason: error.to_string(),
                });
            }
        }
    }

    info!("Loaded {} of {} files", documents.len(), files.len());
    (documents, unreadable)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Summarize an ingestion, listing every document that was left out.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_ingest_report<W: Write>(
    out: &mut W,
    outcome: &IngestOutcome,
    unreadable: &[SkippedDocument],
) -> io::Result<()> {
    let stats = outcome.stats();
    writeln!(
        out,
        "Indexed {} chunks from {} documents.",
        stats.chunk_count, stats.document_count
    )?;
    for skipped in unreadable.iter().chain(&stats.skipped) {
        writeln!(out, "  skipped {}: {}", skipped.source, skipped.reason)?;
    }
    Ok(())
}

/// Print search hits, nearest first.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_hits<W: Write>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    for (rank, hit) in hits.iter().enumerate() {
        writeln!(
            out,
            "{}. {} #{} (distance {:.4})",
            rank + 1,
            hit.chunk.source,
            hit.chunk.chunk_id,
            hit.distance
        )?;
        writeln!(out, "   {}", hit.chunk.preview(HIT_PREVIEW_CHARS))?;
    }
    Ok(())
}

/// Print an answer followed by its references.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_answer<W: Write>(out: &mut W, answer: &Answer) -> io::Result<()> {
    writeln!(out, "Q: {}", answer.question)?;
    writeln!(out, "A: {}", answer.text)?;
    if answer.references.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "References:")?;
    for (rank, reference) in answer.references.iter().enumerate() {
        writeln!(
            out,
            "Source {}: {} #{} (distance {:.4})",
            rank + 1,
            reference.source,
            reference.chunk_id,
            reference.distance
        )?;
        writeln!(out, "   {}", reference.excerpt)?;
    }
    Ok(())
}
