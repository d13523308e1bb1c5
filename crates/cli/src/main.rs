//! soulfetch command-line entry point.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soulfetch_core::{
    convert_directory, load_config, validate_config, AcquisitionEngine, AcquisitionEvent,
    CancellationToken, Config, DownloadLedger, EventHandle, FfmpegTranscoder, JsonWantList,
    SanitizedConfig, SlskdClient, SqliteLedger, Track, TrackSource,
};

#[derive(Parser)]
#[command(
    name = "soulfetch",
    version,
    about = "Playlist-driven Soulseek track acquisition"
)]
struct Cli {
    /// Path to the configuration file (default: $SOULFETCH_CONFIG or
    /// config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the ledger database.
    Init,
    /// Acquire every not-yet-downloaded track from a want-list file.
    Fetch {
        /// JSON file containing the wanted tracks.
        wantlist: PathBuf,
    },
    /// Convert downloaded .flac files to mp3.
    Convert,
    /// Print the effective configuration (secrets redacted).
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| {
        std::env::var("SOULFETCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    });

    let config = load_config(&config_path)
        .with_context(|| format!("failed to load config from {:?}", config_path))?;
    validate_config(&config).context("configuration validation failed")?;

    match cli.command {
        Command::Init => init(&config),
        Command::Fetch { wantlist } => fetch(&config, &wantlist).await,
        Command::Convert => convert(&config).await,
        Command::Config => show_config(&config),
    }
}

fn init(config: &Config) -> Result<()> {
    SqliteLedger::new(&config.database.path).context("failed to create ledger database")?;
    info!(path = ?config.database.path, "ledger database ready");
    Ok(())
}

/// Drop tracks whose ids are already in the ledger.
fn pending_tracks(tracks: Vec<Track>, downloaded: &HashSet<String>) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|t| !downloaded.contains(&t.id))
        .collect()
}

async fn fetch(config: &Config, wantlist: &Path) -> Result<()> {
    let source = JsonWantList::new(wantlist);
    let tracks = source.tracks().await.context("failed to load want-list")?;
    let total = tracks.len();

    let ledger =
        Arc::new(SqliteLedger::new(&config.database.path).context("failed to open ledger")?);
    let downloaded = ledger
        .downloaded_ids()
        .context("failed to read ledger for dedup")?;

    let pending = pending_tracks(tracks, &downloaded);
    info!(
        total = total,
        pending = pending.len(),
        "want-list loaded, already-acquired tracks filtered"
    );

    if pending.is_empty() {
        info!("nothing to do");
        return Ok(());
    }

    let client = Arc::new(SlskdClient::new(config.slskd.clone()));

    let (events, mut rx) = EventHandle::channel(256);
    let printer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            match envelope.event {
                AcquisitionEvent::Acquired {
                    track,
                    username,
                    file,
                    score,
                    ..
                } => {
                    info!(
                        track = %track.title,
                        file = %file.filename,
                        peer = %username,
                        score = score,
                        "acquired"
                    );
                }
                AcquisitionEvent::TierExhausted { track, tier, reason } => {
                    info!(
                        track = %track.title,
                        extension = %tier.extension,
                        min_bitrate = tier.min_bitrate,
                        reason = %reason,
                        "tier exhausted"
                    );
                }
                AcquisitionEvent::Missed { track, reason } => {
                    warn!(track = %track.title, reason = %reason, "missed");
                }
            }
        }
    });

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current poll and stopping");
            interrupt.cancel();
        }
    });

    let engine = AcquisitionEngine::new(config.acquisition.clone(), client, ledger, events);
    let pending_count = pending.len();
    let report = engine.acquire(&pending, &cancel).await;

    // Dropping the engine closes the event channel so the printer drains
    drop(engine);
    printer.await.ok();

    info!(
        acquired = report.acquired,
        missed = report.missed,
        cancelled = report.cancelled,
        "batch finished"
    );

    if report.acquired == 0 && pending_count > 0 {
        bail!("no tracks were acquired");
    }
    Ok(())
}

async fn convert(config: &Config) -> Result<()> {
    let Some(converter) = &config.converter else {
        bail!("no [converter] section in configuration");
    };

    let transcoder = FfmpegTranscoder::new(converter.clone());
    let converted = convert_directory(&transcoder, &converter.downloads_dir)
        .await
        .context("transcode sweep failed")?;

    info!(converted = converted, "transcode sweep finished");
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let sanitized = SanitizedConfig::from(config);
    println!("{}", serde_json::to_string_pretty(&sanitized)?);
    Ok(())
}
