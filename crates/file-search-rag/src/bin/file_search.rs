//! File Search command line client
//!
//! Run with: cargo run -p file-search-rag --bin file-search -- --file notes.md "What changed?"

use anyhow::Context;
use clap::Parser;
use file_search_rag::{
    corpus::{text_upload, FileIntake},
    providers::{ApiKeyCredentials, GeminiStoreClient, InMemoryStoreClient, RemoteStoreClient},
    CorpusOrchestrator, Metadata, PromptSet, RagConfig, SearchService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "file-search")]
#[command(about = "Upload documents to a File Search Store and ask grounded questions", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File to upload (repeatable)
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,

    /// Metadata tag attached to every upload, as key=value (repeatable)
    #[arg(short, long = "metadata", value_parser = parse_pair)]
    metadata: Vec<(String, String)>,

    /// Restrict the search to documents tagged key=value (repeatable)
    #[arg(long = "filter", value_parser = parse_pair)]
    filters: Vec<(String, String)>,

    /// Upload pasted text as a project summary
    #[arg(short, long)]
    text: Option<String>,

    /// Use an in-process store instead of the Gemini API
    #[arg(long)]
    offline: bool,

    /// Question to ask
    question: Option<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    Metadata::parse_pair(raw).ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_search_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref()).context("loading configuration")?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model: {}", config.gemini.model);
    tracing::info!("  - Storage tier: {}", config.storage.tier);

    let (client, credentials): (Arc<dyn RemoteStoreClient>, Arc<ApiKeyCredentials>) = if cli.offline {
        (
            Arc::new(InMemoryStoreClient::new()),
            Arc::new(ApiKeyCredentials::new(Some("offline".to_string()))),
        )
    } else {
        let credentials = Arc::new(ApiKeyCredentials::from_config(&config.gemini));
        let client = GeminiStoreClient::new(&config.gemini, credentials.clone())
            .context("building Gemini client")?;
        (Arc::new(client), credentials)
    };

    let corpus = Arc::new(CorpusOrchestrator::from_config(&config, client, credentials));
    if let Err(err) = corpus.init().await {
        eprintln!("Warning: {}", err.user_message());
    }

    let intake = FileIntake::from_config(&config.upload);
    let metadata: Metadata = cli.metadata.into_iter().collect();
    let metadata = (!metadata.is_empty()).then_some(metadata);

    let mut uploads = Vec::new();
    for path in &cli.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match intake.prepare(bytes, &filename) {
            Ok(upload) => uploads.push(upload),
            Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
        }
    }
    if let Some(text) = cli.text.as_deref() {
        match text_upload(text) {
            Ok(upload) => uploads.push(upload),
            Err(err) => eprintln!("Skipping text: {}", err),
        }
    }

    for upload in uploads {
        let filename = upload.filename.clone();
        match corpus
            .upload_file(upload.bytes, &upload.filename, &upload.mime_type, metadata.clone())
            .await
        {
            Ok(file) => println!("Uploaded {} ({})", file.display_name, file.display_size()),
            Err(err) => eprintln!("Upload of {} failed: {}", filename, err.user_message()),
        }
    }

    let files = corpus.list_files().await;
    println!("\nFiles ({}):", files.len());
    for file in &files {
        println!("  {}  {}  {}", file.display_name, file.mime_type, file.display_size());
    }

    if let Some(question) = cli.question.as_deref() {
        let service = SearchService::new(corpus.clone(), PromptSet::from_config(&config.prompts));
        let filter: Metadata = cli.filters.into_iter().collect();

        match service.search(question, Some(&filter)).await {
            Ok(result) => {
                println!("\n{}\n", result.response);
                if result.has_citations() {
                    println!("Sources:");
                    for (i, citation) in result.citations.iter().enumerate() {
                        println!("  [{}] {}", i + 1, citation);
                    }
                }
            }
            Err(err) => eprintln!("\nSearch failed: {}", err.user_message()),
        }
    }

    println!("\n{}", corpus.status_line().await);
    corpus.close().await;
    Ok(())
}
