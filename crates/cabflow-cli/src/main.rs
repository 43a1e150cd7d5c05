//! Operator command line for the cabflow booking pipeline.
//!
//! Thin glue only: reads input files, wires the configured collaborators
//! together, and prints results. All pipeline logic lives in the library
//! crates.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cabflow_autocab::{AutocabClient, SubmissionOptions, SubmissionOutcome, SubmissionWorkflow};
use cabflow_chat::{ChatMessage, ConversationalExtractor, OpenAiChatModel};
use cabflow_core::AppConfig;
use cabflow_geo::{AddressNormalizer, HttpGeocoder, LandmarkTable};

#[derive(Debug, Parser)]
#[command(name = "cabflow-cli")]
#[command(about = "Cabflow booking pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a canonical booking record from a booking email file.
    Extract {
        #[arg(long)]
        file: PathBuf,
    },
    /// Resolve a free-text address to coordinates and a dispatch zone.
    Resolve {
        #[arg(long)]
        address: String,
    },
    /// Run one conversational extraction turn from a transcript file.
    ///
    /// Lines are `user: …` / `assistant: …`; the final user line is the new
    /// message.
    Chat {
        #[arg(long)]
        file: PathBuf,
    },
    /// Extract, resolve, and submit a booking to the dispatch system.
    Submit {
        #[arg(long)]
        file: PathBuf,
        /// Edit this existing booking instead of creating a new one.
        #[arg(long)]
        booking_id: Option<i64>,
        /// Enable the manual price override (admin mode).
        #[arg(long)]
        admin_price: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cabflow_core::load_app_config().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { file } => extract_command(&file),
        Commands::Resolve { address } => resolve_command(&config, &address).await,
        Commands::Chat { file } => chat_command(&config, &file).await,
        Commands::Submit {
            file,
            booking_id,
            admin_price,
        } => submit_command(&config, &file, booking_id, admin_price).await,
    }
}

fn extract_command(file: &Path) -> anyhow::Result<()> {
    let email = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let job = cabflow_extract::extract(&email);
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

async fn resolve_command(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let geocoder = build_geocoder(config)?;
    let autocab = build_autocab(config)?;
    let normalizer =
        AddressNormalizer::new(&geocoder, &autocab).with_landmarks(landmarks(config)?);
    let resolved = normalizer.normalize(address).await;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

async fn chat_command(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let Some(api_key) = &config.llm_api_key else {
        bail!("CABFLOW_LLM_API_KEY is required for chat extraction");
    };
    let model = OpenAiChatModel::new(
        api_key,
        &config.llm_model,
        config.http_timeout_secs,
        &config.llm_base_url,
    )?;

    let transcript = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let (history, message) = parse_transcript(&transcript)?;

    let extractor = ConversationalExtractor::new(&model);
    let result = extractor.extract_incremental(&message, &history).await;

    println!("{}", serde_json::to_string_pretty(&result.data)?);
    if let Some(question) = &result.next_question {
        println!("missing: {}", result.missing_fields.join(", "));
        println!("next question: {question}");
    } else {
        println!("all required fields captured");
    }
    Ok(())
}

async fn submit_command(
    config: &AppConfig,
    file: &Path,
    booking_id: Option<i64>,
    admin_price: bool,
) -> anyhow::Result<()> {
    let email = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let job = cabflow_extract::extract(&email);

    let geocoder = build_geocoder(config)?;
    let autocab = build_autocab(config)?;
    let normalizer =
        AddressNormalizer::new(&geocoder, &autocab).with_landmarks(landmarks(config)?);
    let resolved = normalizer.normalize_stops(&job).await;

    let workflow = SubmissionWorkflow::new(&autocab);
    let options = SubmissionOptions {
        admin_mode: admin_price,
    };
    let outcome = workflow.submit(&job, &resolved, options, booking_id).await?;

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            id_changed,
            groups_submitted,
            groups_failed,
        } => {
            println!("booking {booking_id} submitted ({groups_submitted} group(s), {groups_failed} failed)");
            if id_changed {
                println!("note: the original booking no longer existed; id has changed");
            }
        }
        SubmissionOutcome::DuplicateDetected { existing } => {
            println!(
                "duplicate detected: booking {} already carries this job number",
                existing.booking_id
            );
        }
        SubmissionOutcome::Failed { status, body } => {
            bail!("submission failed (status {status:?}): {body}");
        }
    }
    Ok(())
}

fn build_geocoder(config: &AppConfig) -> anyhow::Result<HttpGeocoder> {
    let Some(api_key) = &config.geocoder_api_key else {
        bail!("CABFLOW_GEOCODER_API_KEY is required for address resolution");
    };
    Ok(HttpGeocoder::with_base_url(
        api_key,
        config.http_timeout_secs,
        &config.geocoder_base_url,
    )?)
}

fn build_autocab(config: &AppConfig) -> anyhow::Result<AutocabClient> {
    let Some(api_key) = &config.autocab_api_key else {
        bail!("CABFLOW_AUTOCAB_API_KEY is required to reach the booking system");
    };
    Ok(AutocabClient::with_base_url(
        api_key,
        config.http_timeout_secs,
        &config.autocab_base_url,
    )?
    .with_retry_policy(config.http_max_retries, config.http_backoff_base_ms))
}

fn landmarks(config: &AppConfig) -> anyhow::Result<LandmarkTable> {
    match &config.landmarks_path {
        Some(path) => LandmarkTable::from_file(path)
            .with_context(|| format!("loading landmarks from {}", path.display())),
        None => Ok(LandmarkTable::builtin()),
    }
}

/// Splits a `user:`/`assistant:` transcript into history plus the final
/// user message.
fn parse_transcript(transcript: &str) -> anyhow::Result<(Vec<ChatMessage>, String)> {
    let mut messages: Vec<ChatMessage> = Vec::new();
    for line in transcript.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(content) = line.strip_prefix("user:") {
            messages.push(ChatMessage::user(content.trim()));
        } else if let Some(content) = line.strip_prefix("assistant:") {
            messages.push(ChatMessage::assistant(content.trim()));
        } else {
            bail!("transcript lines must start with 'user:' or 'assistant:': {line}");
        }
    }
    match messages.pop() {
        Some(last) if last.role == cabflow_chat::Role::User => Ok((messages, last.content)),
        Some(_) => bail!("the transcript must end with a user line"),
        None => bail!("the transcript is empty"),
    }
}
