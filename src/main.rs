//! Binary entrypoint for the carousel engine.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use photo_carousel::config::Configuration;
use photo_carousel::contact::{ContactClient, ContactForm};
use photo_carousel::events::{ControlEvent, PreloadCommand, RenderCommand, ResourceLoaded};
use photo_carousel::source::PhotoSource;
use photo_carousel::tasks::preload::HttpFetcher;
use photo_carousel::tasks::{controller, preload, viewer};

#[derive(Debug, Parser)]
#[command(name = "photo-carousel", about = "Headless gallery carousel engine")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the photo manifest and run the carousel engine.
    Run {
        /// Override the auto-advance interval (e.g. "5s").
        #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
        auto_advance: Option<Duration>,
    },
    /// Submit a message through the contact endpoint.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("photo_carousel={level}").parse().unwrap());
    fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .validated()
        .context("validating configuration")?;

    match cli.command {
        Command::Run { auto_advance } => run_engine(cfg, auto_advance).await,
        Command::Contact {
            name,
            email,
            message,
        } => submit_contact(cfg, name, email, message).await,
    }
}

async fn run_engine(mut cfg: Configuration, auto_advance: Option<Duration>) -> Result<()> {
    if let Some(interval) = auto_advance {
        cfg.carousel.auto_advance = interval;
    }

    let source = PhotoSource::new(&cfg.source);
    let photos = source.fetch(cfg.source.variant).await?;

    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(64);
    let (render_tx, render_rx) = mpsc::channel::<RenderCommand>(64);
    let (preload_tx, preload_rx) = mpsc::channel::<PreloadCommand>(64);
    let (loaded_tx, loaded_rx) = mpsc::channel::<ResourceLoaded>(64);
    let cancel = CancellationToken::new();

    let controller_task = tokio::spawn(controller::run(
        cfg.carousel.clone(),
        control_rx,
        render_tx,
        preload_tx,
        cancel.clone(),
    ));
    let preload_task = tokio::spawn(preload::run(
        preload_rx,
        loaded_tx,
        HttpFetcher::new(),
        cancel.clone(),
        4,
    ));
    let viewer_task = tokio::spawn(viewer::run(render_rx, loaded_rx, cancel.clone()));

    control_tx
        .send(ControlEvent::SetPhotos(photos))
        .await
        .context("controller task unavailable")?;

    info!("carousel running; ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("listening for ctrl-c")?;
    cancel.cancel();

    for task in [controller_task, preload_task, viewer_task] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(error = %err, "task failed"),
            Err(err) => error!(error = %err, "task panicked"),
        }
    }
    Ok(())
}

async fn submit_contact(
    cfg: Configuration,
    name: String,
    email: String,
    message: String,
) -> Result<()> {
    let client = ContactClient::new(&cfg.contact);
    let mut form = ContactForm::new(cfg.contact.access_key.clone());
    form.name = name;
    form.email = email;
    form.message = message;

    match client.submit(&form).await {
        Ok(confirmation) => info!(%confirmation, "contact form accepted"),
        Err(err) => error!(error = %err, "contact form failed"),
    }
    // The page keeps the outcome banner up for this long before hiding it.
    tokio::time::sleep(cfg.contact.result_visible).await;
    info!("status banner hidden");
    Ok(())
}
