//! docchat CLI
//!
//! Inspect how a document is indexed and which context a query would be
//! answered from, without a web front end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use docchat_core::extraction::ScratchSpace;
use docchat_core::generation::{GenerationError, GenerationRequest, Generator};
use docchat_core::service::{SectionsRequest, Upload};
use docchat_core::session::InMemorySessionStore;
use docchat_core::types::{ContextWindow, SessionId};
use docchat_core::{DocumentChat, EngineConfig};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "docchat - Document-grounded chat engine", long_about = None)]
struct Cli {
    /// JSON engine configuration (defaults apply to missing keys)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a PDF or PPTX and list its pages and sections
    Index {
        file: PathBuf,
    },
    /// Show the context window and instruction a query resolves to
    Prompt {
        file: PathBuf,
        query: String,
    },
    /// Answer a query against a document through the generation service
    #[cfg(feature = "http")]
    Ask {
        file: PathBuf,
        query: String,
        /// Chat-completions endpoint
        #[arg(long, default_value = docchat_core::generation::http::TOGETHER_ENDPOINT)]
        endpoint: String,
    },
}

/// Stand-in when no generation service is configured: every call fails, so
/// over-budget selections fall back to truncated text.
struct Offline;

impl Generator for Offline {
    fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("no generation service configured".into()))
    }
}

#[derive(Serialize)]
struct IndexOutput {
    filename: String,
    version: String,
    pages: usize,
    sections: Vec<docchat_core::service::SectionEntry>,
}

#[derive(Serialize)]
struct PromptOutput<'a> {
    filename: Option<&'a str>,
    window: Option<&'a ContextWindow>,
    intent: docchat_core::prompt::Intent,
    prompt: &'a str,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::v0(),
    };

    match cli.command {
        Commands::Index { file } => {
            let engine = engine(Offline, config)?;
            let session = SessionId::generate();
            let receipt = upload(&engine, &session, &file)?;
            let sections = engine.sections(
                &session,
                &SectionsRequest {
                    session_id: None,
                    filename: Some(receipt.filename.clone()),
                },
            )?;

            print_json(&IndexOutput {
                filename: receipt.filename,
                version: receipt.version.to_string(),
                pages: receipt.pages,
                sections: sections.sections,
            })
        }
        Commands::Prompt { file, query } => {
            let engine = engine(Offline, config)?;
            let session = SessionId::generate();
            upload(&engine, &session, &file)?;

            let turn = engine.prepare(&session, &query);
            print_json(&PromptOutput {
                filename: turn.filename.as_deref(),
                window: turn.window.as_ref(),
                intent: turn.prompt.intent,
                prompt: &turn.prompt.text,
            })
        }
        #[cfg(feature = "http")]
        Commands::Ask {
            file,
            query,
            endpoint,
        } => {
            let api_key = std::env::var("DOCCHAT_API_KEY").context("DOCCHAT_API_KEY is not set")?;
            let generator = docchat_core::generation::http::HttpGenerator::new(endpoint, api_key)?;
            let engine = engine(generator, config)?;
            let session = SessionId::generate();
            upload(&engine, &session, &file)?;

            let reply = engine.chat(
                &session,
                &docchat_core::service::ChatRequest {
                    session_id: None,
                    message: Some(query),
                },
            )?;
            println!("{}", reply.response);
            Ok(())
        }
    }
}

fn engine<G: Generator>(generator: G, config: EngineConfig) -> Result<DocumentChat<InMemorySessionStore, G>> {
    let scratch = ScratchSpace::temporary().context("creating scratch directory")?;
    Ok(DocumentChat::new(
        Arc::new(InMemorySessionStore::new()),
        generator,
        scratch,
        config,
    ))
}

fn upload<G: Generator>(
    engine: &DocumentChat<InMemorySessionStore, G>,
    session: &SessionId,
    file: &Path,
) -> Result<docchat_core::service::UploadReceipt> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let Some(filename) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        bail!("{} has no file name", file.display());
    };

    let receipt = engine.upload(
        session,
        Upload {
            filename: Some(filename),
            bytes,
            quiz_mode: false,
        },
    )?;
    Ok(receipt)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
