use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod batch;
mod config;
mod history;
mod media;
mod menu;
mod utils;

use config::Config;
use media::{tools, DownloadMode, Session, SystemRunner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one link per line; runs a batch download and exits
    batch_file: Option<PathBuf>,

    /// Download mode for the batch (asked interactively when omitted)
    #[arg(short, long, value_enum)]
    mode: Option<DownloadMode>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn log_writer(config: &Config) -> BoxMakeWriter {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(log_writer(config))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(log_writer(config))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match config::find_config_path(args.config.as_deref()) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config);
    info!("--- New session started ---");

    let bin_dir = config.bin_dir();
    tools::prepend_to_path(&bin_dir);

    let missing = tools::missing_dependencies();
    if !missing.is_empty() {
        error!("Missing dependencies: {}", missing.join(", "));
        eprintln!("Error: The following dependencies are missing:");
        for dep in &missing {
            eprintln!("- {}", dep);
        }
        eprintln!("Please install them and try again.");
        std::process::exit(1);
    }

    let session = Session::new(config.cookie_browser);
    let runner = SystemRunner::new();
    let ui = menu::ui::TerminalUi::new();

    if let Some(path) = args.batch_file {
        info!("Running batch from {}", path.display());
        let mode = match args.mode {
            Some(mode) => mode,
            None => match batch::choose_mode(&ui)? {
                Some(mode) => mode,
                None => return Ok(()),
            },
        };
        batch::run_batch(&path, mode, &session, &runner, &ui).await?;
        return Ok(());
    }

    let history = history::HistoryStore::in_dir(&config::config_dir());
    info!("History file: {}", history.path().display());
    menu::App::new(session, &runner, history, &ui, bin_dir)
        .run()
        .await
}
