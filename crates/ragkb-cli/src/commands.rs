//! Subcommand handlers

use colored::*;
use std::path::Path;

use ragkb_core::{IngestReport, QueryAnswer, Result, StoreStats};
use ragkb_rag::RagPipeline;

use crate::ui::{
    confirm, display_banner, format_answer, format_ingest_report, format_stats, is_exit_command,
    read_question,
};

/// Ingest `directory`, falling back to the configured chunking parameters
pub async fn cmd_ingest(
    pipeline: &RagPipeline,
    directory: &Path,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
    clear: bool,
) -> Result<IngestReport> {
    let chunking = &pipeline.config().chunking;
    let chunk_size = chunk_size.unwrap_or(chunking.chunk_size);
    let overlap = overlap.unwrap_or(chunking.overlap);

    println!(
        "{} Ingesting {} (chunk size {}, overlap {})",
        "📚".blue(),
        directory.display(),
        chunk_size,
        overlap
    );

    let report = pipeline.ingest(directory, chunk_size, overlap, clear).await?;
    println!("{}", format_ingest_report(&report, directory));
    Ok(report)
}

async fn answer_question(pipeline: &RagPipeline, question: &str, k: usize) -> Result<QueryAnswer> {
    println!("{} Searching...", "🔎".blue());
    let answer = pipeline.query(question, k).await?;
    println!("{}", format_answer(&answer));
    Ok(answer)
}

/// Answer one question, or run the interactive loop when `question` is `None`
pub async fn cmd_query(pipeline: &RagPipeline, question: Option<&str>, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(pipeline.config().retrieval.top_k);

    if let Some(question) = question {
        answer_question(pipeline, question, k).await?;
        return Ok(());
    }

    display_banner();
    let mut history = Vec::new();

    while let Some(input) = read_question(&mut history)? {
        if input.is_empty() {
            continue;
        }
        if is_exit_command(&input) {
            break;
        }

        if let Err(e) = answer_question(pipeline, &input, k).await {
            tracing::warn!(error = %e, "Query failed");
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        println!();
    }

    println!("{}", "Goodbye!".green());
    Ok(())
}

pub async fn cmd_stats(pipeline: &RagPipeline) -> Result<StoreStats> {
    let stats = pipeline.get_stats().await?;
    println!("{}", format_stats(&stats));
    Ok(stats)
}

/// Delete every chunk, asking first unless `force` is set
///
/// Returns `None` when the user declines.
pub async fn cmd_clear(pipeline: &RagPipeline, force: bool) -> Result<Option<usize>> {
    if !force && !confirm("Delete every chunk in the knowledge base?")? {
        println!("{}", "Cancelled".dimmed());
        return Ok(None);
    }

    let deleted = pipeline.clear().await?;
    println!("{} Deleted {} chunks", "✓".green(), deleted);
    Ok(Some(deleted))
}
