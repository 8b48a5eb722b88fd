use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod scoring_cmd;
mod state;

use scoring_cmd::FeedbackArgs;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Adaptive confidence scoring for AI-recognized transactions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a recognition result (JSON object of field -> value)
    Score {
        /// Recognizer output, e.g. {"amount": 32.5, "category": "餐饮"}
        #[arg(long)]
        input: PathBuf,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Record the user's verdict on one suggested value
    #[command(group(ArgGroup::new("verdict").required(true).args(["correct", "incorrect"])))]
    Feedback {
        /// amount | category | account | description | date | notes
        #[arg(long)]
        field: String,

        /// Value the recognizer produced
        #[arg(long)]
        original: String,

        /// Value the user replaced it with
        #[arg(long)]
        corrected: Option<String>,

        #[arg(long)]
        correct: bool,

        #[arg(long)]
        incorrect: bool,

        /// Confidence that was shown (defaults to the current suggestion)
        #[arg(long)]
        confidence: Option<f64>,
    },

    /// Derive feedback by comparing a recognition result with the saved transaction
    Review {
        /// Recognizer output (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Values the user finally saved (JSON, same shape)
        #[arg(long = "final")]
        finalized: PathBuf,
    },

    /// Per-field feedback counts, accuracy and current suggestion
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Erase all feedback history
    Reset,

    /// Export feedback history as CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective scoring table and ledger path
    Show,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => show_config()?,
        },

        command => {
            let cfg = config::load_config()?;
            match command {
                Command::Score { input, json } => scoring_cmd::score(&cfg, &input, json)?,
                Command::Feedback {
                    field,
                    original,
                    corrected,
                    correct,
                    incorrect: _,
                    confidence,
                } => {
                    scoring_cmd::feedback(
                        &cfg,
                        FeedbackArgs {
                            field: &field,
                            original: &original,
                            corrected: corrected.as_deref(),
                            was_correct: correct,
                            confidence,
                        },
                    )
                    .await?
                }
                Command::Review { input, finalized } => {
                    scoring_cmd::review(&cfg, &input, &finalized).await?
                }
                Command::Stats { json } => scoring_cmd::stats(&cfg, json)?,
                Command::Reset => scoring_cmd::reset(&cfg).await?,
                Command::Export { csv } => scoring_cmd::export(&cfg, &csv)?,
                Command::Config { .. } => unreachable!("handled above"),
            }
        }
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::load_config()?;
    let scoring = cfg.scoring_config()?;

    println!("Config file: {}", config::config_path()?.display());
    println!("Ledger:      {}\n", cfg.ledger_path()?.display());
    println!("{:<12} {:>8}", "FIELD", "DEFAULT");
    for field in tally_core::Field::ALL {
        println!("{:<12} {:>8.2}", field, scoring.default_for(field));
    }
    println!(
        "\nlow < {:.2} <= medium < {:.2} <= high",
        scoring.low_confidence_threshold(),
        scoring.medium_confidence_threshold()
    );
    Ok(())
}
