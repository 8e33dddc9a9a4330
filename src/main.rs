use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chatlens::analysis::{
    AggregationEngine, GeminiScorer, PartitionReport, Report, Selection, SentimentValue, StopWords,
};
use chatlens::config::AppConfig;
use chatlens::transcript::{self, MessageRecord};
use chatlens::web;

#[derive(Parser)]
#[command(name = "chatlens")]
#[command(about = "Analyze exported chat transcripts: activity, words, emoji and sentiment", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Skip sentiment scoring even when GEMINI_API_KEY is set.
    #[arg(long, global = true)]
    no_sentiment: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the analysis of a transcript as JSON.
    Report {
        transcript: PathBuf,
        /// Author to analyze; "Overall" for everyone.
        #[arg(short, long, default_value = "Overall")]
        user: String,
        /// Restrict to one sentiment value (-1, 0 or 1).
        #[arg(short, long, allow_hyphen_values = true)]
        sentiment: Option<i8>,
    },
    /// Serve the analysis of a transcript over HTTP.
    Serve { transcript: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatlens=info".into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config.display());
    let config = AppConfig::load(&cli.config)?;

    let stop_words = match &config.analysis.stop_words_path {
        Some(path) => StopWords::load(path)?,
        None => {
            warn!("No stop word list configured, word tables are unfiltered");
            StopWords::default()
        }
    };
    let engine =
        AggregationEngine::new(stop_words).with_media_marker(config.analysis.media_marker.clone());
    let limits = config.analysis.limits();

    match cli.command {
        Commands::Report {
            transcript,
            user,
            sentiment,
        } => {
            let records = load_records(&transcript, &config, cli.no_sentiment).await?;
            let selection = Selection::author(&user);
            let json = match sentiment {
                Some(raw) => {
                    let value = SentimentValue::try_from(raw).map_err(anyhow::Error::msg)?;
                    let report = PartitionReport::build(&engine, &records, &selection, value, limits);
                    serde_json::to_string_pretty(&report)?
                }
                None => {
                    let report = Report::build(&engine, &records, &selection, limits);
                    serde_json::to_string_pretty(&report)?
                }
            };
            println!("{}", json);
        }
        Commands::Serve { transcript } => {
            let records = load_records(&transcript, &config, cli.no_sentiment).await?;
            let state = web::state::AppState::new(records, engine, limits);
            let router = web::create_router(state);

            let addr = format!("{}:{}", config.web.host, config.web.port);
            info!("Starting web server at http://{}", addr);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}

/// Parses the transcript and attaches sentiment scores when a scorer is available.
async fn load_records(path: &Path, config: &AppConfig, no_sentiment: bool) -> Result<Vec<MessageRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read transcript {}", path.display()))?;
    info!("Read {} bytes from {}", raw.len(), path.display());

    let parsed = transcript::parse(&raw)
        .with_context(|| format!("Failed to parse transcript {}", path.display()))?;
    let mut records = parsed.records;

    match (&config.gemini.api_key, no_sentiment) {
        (_, true) => info!("Sentiment scoring disabled"),
        (None, false) => warn!("GEMINI_API_KEY not set, sentiment sections will be empty"),
        (Some(key), false) => {
            let scorer = Arc::new(GeminiScorer::new(&config.gemini, key.clone()));
            let scored = scorer.score_all(&mut records).await?;
            info!("Scored {} of {} messages", scored, records.len());
        }
    }

    Ok(records)
}
