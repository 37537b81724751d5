mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_client::backend::HttpBackend;
use resume_client::config::Config;
use resume_client::controller::{SubmissionController, SubmitOutcome};
use resume_client::download::{DirectorySink, FileType};
use resume_client::models::Submission;
use resume_client::preview::Markup;
use resume_client::validation::validate;

use crate::terminal::{prompt_submission, TerminalView};

#[derive(Parser, Debug)]
#[command(
    name = "resume-client",
    about = "Fill in, preview and submit a resume to the resume builder service",
    version
)]
struct Cli {
    /// JSON file with the form fields (prompted on stdin when omitted)
    #[arg(long, global = true)]
    input: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every problem with the form fields
    Validate,
    /// Print the live preview fragment
    Preview {
        /// Interpolate field values without escaping
        #[arg(long)]
        raw: bool,
    },
    /// Submit the form and optionally download the generated files
    Submit(SubmitArgs),
    /// Download one generated file
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// File to fetch after a successful submission (repeatable)
    #[arg(long = "download", value_parser = parse_file_type)]
    downloads: Vec<FileType>,
    /// Directory for downloaded files (defaults to DOWNLOAD_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Timestamp returned by a successful submission
    timestamp: String,
    /// pdf, html, json or cover_letter
    #[arg(value_parser = parse_file_type)]
    file_type: FileType,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_file_type(raw: &str) -> Result<FileType, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let input = cli.input.as_deref();
    match cli.command {
        Command::Validate => run_validate(input),
        Command::Preview { raw } => run_preview(input, raw, &config),
        Command::Submit(args) => run_submit(input, args, &config).await,
        Command::Download(args) => run_download(args, &config).await,
    }
}

fn load_submission(input: Option<&Path>) -> Result<Submission> {
    let Some(path) = input else {
        return prompt_submission();
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid form JSON", path.display()))
}

fn controller_for(submission: Submission, config: &Config) -> Result<SubmissionController> {
    let backend = HttpBackend::from_config(config)?;
    Ok(SubmissionController::from_config(
        Arc::new(TerminalView::new(submission)),
        Arc::new(backend),
        config,
    ))
}

fn run_validate(input: Option<&Path>) -> Result<ExitCode> {
    let errors = validate(&load_submission(input)?);
    if errors.is_empty() {
        println!("All fields are valid");
        return Ok(ExitCode::SUCCESS);
    }
    for error in &errors {
        println!("- {error}");
    }
    Ok(ExitCode::FAILURE)
}

fn run_preview(input: Option<&Path>, raw: bool, config: &Config) -> Result<ExitCode> {
    let markup = if raw { Markup::Raw } else { config.markup };
    let controller = controller_for(load_submission(input)?, config)?.with_markup(markup);
    controller.on_input();
    Ok(ExitCode::SUCCESS)
}

async fn run_submit(input: Option<&Path>, args: SubmitArgs, config: &Config) -> Result<ExitCode> {
    let controller = controller_for(load_submission(input)?, config)?;
    info!(api = %config.api_url, path = %config.submit_path, "submitting resume");

    let response = match controller.submit().await {
        SubmitOutcome::Created(response) => response,
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) | SubmitOutcome::Busy => {
            return Ok(ExitCode::FAILURE)
        }
    };

    if args.downloads.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let timestamp = response
        .timestamp
        .context("Backend response did not include a timestamp to download with")?;
    let sink = DirectorySink::new(args.out.unwrap_or_else(|| config.download_dir.clone()));

    let mut failed = false;
    for file_type in args.downloads {
        match controller.download(&timestamp, file_type, &sink).await {
            Ok(path) => eprintln!("Saved {}", path.display()),
            Err(_) => failed = true,
        }
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn run_download(args: DownloadArgs, config: &Config) -> Result<ExitCode> {
    let controller = controller_for(Submission::default(), config)?;
    let sink = DirectorySink::new(args.out.unwrap_or_else(|| config.download_dir.clone()));

    match controller.download(&args.timestamp, args.file_type, &sink).await {
        Ok(path) => {
            eprintln!("Saved {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
