use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use ragkb_cli::{cmd_clear, cmd_ingest, cmd_query, cmd_stats, init_logging};
use ragkb_core::RagConfig;
use ragkb_openai::OpenAiClient;
use ragkb_rag::{DirectoryLoader, JsonFileVectorStore, RagPipeline, TextChunker};

#[derive(Parser)]
#[command(name = "ragkb")]
#[command(about = "Ask questions about your own documents", long_about = None)]
struct Cli {
    /// Vector store file (overrides RAG_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load, chunk, embed and store every document in a directory
    Ingest {
        #[arg(short, long, default_value = "knowledge_base")]
        directory: PathBuf,

        /// Tokens per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Tokens shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,

        /// Delete existing chunks first
        #[arg(long)]
        clear: bool,
    },
    /// Answer a question, or start an interactive session
    Query {
        /// Number of chunks to retrieve
        #[arg(short, long = "top-k")]
        k: Option<usize>,

        #[arg(short, long)]
        question: Option<String>,
    },
    /// Show knowledge base statistics
    Stats,
    /// Delete every stored chunk
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = RagConfig::from_env()?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }

    let client = Arc::new(OpenAiClient::from_env()?);
    let store = Arc::new(
        JsonFileVectorStore::open(&config.store.path)
            .with_context(|| format!("opening vector store {}", config.store.path.display()))?,
    );
    tracing::info!(store = %config.store.path.display(), "Pipeline ready");

    let pipeline = RagPipeline::new(
        config,
        store,
        client.clone(),
        client,
        Arc::new(DirectoryLoader::new()),
        TextChunker::cl100k()?,
    );

    match cli.command {
        Command::Ingest {
            directory,
            chunk_size,
            overlap,
            clear,
        } => {
            cmd_ingest(&pipeline, &directory, chunk_size, overlap, clear).await?;
        }
        Command::Query { k, question } => {
            cmd_query(&pipeline, question.as_deref(), k).await?;
        }
        Command::Stats => {
            cmd_stats(&pipeline).await?;
        }
        Command::Clear { force } => {
            cmd_clear(&pipeline, force).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_k(args: &[&str]) -> Option<usize> {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Query { k, .. } => k,
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_query_top_k_flags() {
        assert_eq!(query_k(&["ragkb", "query", "-k", "3"]), Some(3));
        assert_eq!(query_k(&["ragkb", "query", "--top-k", "7"]), Some(7));
        assert_eq!(query_k(&["ragkb", "query", "-q", "hi"]), None);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
