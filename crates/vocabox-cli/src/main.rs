//! Vocabox CLI
//!
//! Terminal front end for the Leitner vocabulary scheduler.

mod progress;
mod study;
mod terminal;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use vocabox_core::{SchedulerConfig, SqliteStore};

/// Vocabox - Leitner-box vocabulary trainer
#[derive(Parser)]
#[command(name = "vocabox")]
#[command(author = "Vocabox Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Study vocabulary with Leitner boxes and practice rounds")]
#[command(long_about = "Vocabox schedules words into six boxes.\n\n\
    Positive ratings are confirmed by a practice exercise before they count.")]
struct Cli {
    /// Custom data directory (holds progress.db and config.json)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Scheduler config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive study session
    Study {
        /// Learner id
        #[arg(long, default_value = "default")]
        user: String,
        /// Topic to study
        #[arg(long)]
        topic: String,
        /// Vocabulary file (JSON array of items)
        #[arg(long)]
        vocab: PathBuf,
        /// Text-to-speech program invoked with the word as its argument (e.g. espeak)
        #[arg(long)]
        speech_cmd: Option<String>,
    },

    /// Show box distribution, due words and quiz history for a topic
    Progress {
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long)]
        topic: String,
        /// Vocabulary file, to count words never studied
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Put a word back into box 0, due now
    Reset {
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long)]
        topic: String,
        /// Word id
        #[arg(long)]
        word: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the flashcards
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = load_config(cli.config.as_deref(), &data_dir)?;
    let store = SqliteStore::open(Some(data_dir.join("progress.db")))
        .context("Failed to open progress database")?;
    debug!("Using data directory {}", data_dir.display());

    match cli.command {
        Commands::Study {
            user,
            topic,
            vocab,
            speech_cmd,
        } => {
            study::run(
                study::StudyArgs {
                    user,
                    topic,
                    vocab,
                    speech_cmd,
                },
                store,
                config,
            )
            .await
        }
        Commands::Progress { user, topic, vocab } => {
            progress::run_progress(&store, &user, &topic, vocab.as_deref())
        }
        Commands::Reset { user, topic, word } => progress::run_reset(&store, &user, &topic, &word),
    }
}

/// `--data-dir`, or the platform data directory
fn resolve_data_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => ProjectDirs::from("com", "vocabox", "vocabox")
            .context("Could not determine project directories")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

/// `--config`, else `config.json` in the data directory, else defaults
fn load_config(explicit: Option<&Path>, data_dir: &Path) -> anyhow::Result<SchedulerConfig> {
    if let Some(path) = explicit {
        return SchedulerConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()));
    }
    let implicit = data_dir.join("config.json");
    if implicit.exists() {
        return SchedulerConfig::load(&implicit)
            .with_context(|| format!("Failed to read config {}", implicit.display()));
    }
    Ok(SchedulerConfig::default())
}
