//! services/client/src/bin/flash.rs

use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{
        CommandClipboard, GeminiAdapter, HttpRecordStore, MissingGenerator, OpenAiTextAdapter,
    },
    config::{ClientConfig, GenerationProvider},
    error::ClientError,
    render::render,
};
use flash_core::ports::TextGenerationService;
use flash_core::StudyController;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Turn pasted text into study questions and keep flashcards.
#[derive(Parser, Debug)]
#[command(name = "flash", version)]
struct Cli {
    /// Also print the flashcard panel.
    #[arg(long, global = true)]
    show_flashcards: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show stored summaries (and flashcards with --show-flashcards).
    List,
    /// Generate questions from text and store the result as a summary.
    Submit {
        /// The text to study. Read from --file or stdin when omitted.
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Save an item, or any text, as a flashcard.
    Promote(PromoteArgs),
    /// Delete a flashcard by id.
    Delete { id: Uuid },
    /// Copy the text of a listed item to the system clipboard.
    Copy { index: usize },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct PromoteArgs {
    /// Position of the item in the list.
    #[arg(long)]
    item: Option<usize>,
    /// Text to save as-is.
    #[arg(long)]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("flash: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = ClientConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!(api = %config.api_base_url, "configuration loaded");

    // --- 2. Initialize Adapters ---
    let store_http = reqwest::Client::builder()
        .timeout(config.timeouts.store)
        .build()?;
    let store = Arc::new(HttpRecordStore::new(store_http, config.api_base_url.clone()));
    let generator = build_generator(&config)?;
    let controller =
        StudyController::new(store, generator, Arc::new(CommandClipboard::default()))
            .with_timeouts(config.timeouts);
    if cli.show_flashcards {
        controller.toggle_flashcards();
    }

    // --- 3. Load, Run the Command & Render ---
    let loaded = controller.load().await;
    let outcome = match (loaded, cli.command) {
        (Err(e), _) => Err(e),
        (Ok(()), Command::List) => Ok(()),
        (Ok(()), Command::Submit { text, file }) => {
            controller.set_input(read_input(text, file)?);
            controller.submit().await.map(|outcome| {
                info!(summary_id = %outcome.summary.id, "summary saved");
            })
        }
        (Ok(()), Command::Promote(args)) => {
            // clap guarantees exactly one of the two.
            let promoted = match args.item {
                Some(index) => controller.promote_item(index).await,
                None => {
                    let text = args.text.unwrap_or_default();
                    controller.promote_to_flashcard(&text).await
                }
            };
            promoted.map(|card| info!(flashcard_id = %card.id, "flashcard saved"))
        }
        (Ok(()), Command::Delete { id }) => controller.delete_flashcard(id).await,
        (Ok(()), Command::Copy { index }) => controller.copy_item(index).await,
    };

    print!("{}", render(&controller.snapshot()));
    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Picks the configured generator, or one that reports why none is available.
fn build_generator(config: &ClientConfig) -> Result<Arc<dyn TextGenerationService>, ClientError> {
    let provider = match &config.generation {
        Ok(provider) => provider,
        Err(reason) => return Ok(Arc::new(MissingGenerator::new(reason.to_string()))),
    };
    Ok(match provider {
        GenerationProvider::Gemini {
            api_key,
            model,
            base_url,
        } => {
            let http = reqwest::Client::builder()
                .timeout(config.timeouts.generation)
                .build()?;
            Arc::new(GeminiAdapter::new(
                http,
                base_url.clone(),
                model.clone(),
                api_key.clone(),
            ))
        }
        GenerationProvider::OpenAi { api_key, model } => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key.clone());
            Arc::new(OpenAiTextAdapter::new(
                OpenAiClient::with_config(openai_config),
                model.clone(),
            ))
        }
    })
}

/// The positional text, else the file, else all of stdin.
fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String, ClientError> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
