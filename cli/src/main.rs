use std::path::PathBuf;

use clap::Parser;
use slain_core::context::{AppConfig, TrackerSession};
use slain_core::session::persist;
use slain_core::sinks::OverlayFileSink;
use slain_core::tail::LogTailer;
use slain_core::{discover, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slain", version, about = "Death and leveling tracker for Path of Exile 2")]
struct Cli {
    /// Path to Client.txt (defaults to the configured or discovered install)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Output directory for overlay stat files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore persisted state and rebuild everything from the full log
    #[arg(long)]
    fresh: bool,

    /// Skip the startup replay and only track events from now on
    #[arg(long)]
    no_replay: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|err| {
        tracing::warn!("[CLI] unreadable config ({err}); using defaults");
        AppConfig::default()
    });
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(path) = cli.path {
        config.log_path = Some(path);
    }

    let Some(log_path) = config.log_path.clone().or_else(discover::find_client_log) else {
        tracing::error!("[CLI] no Client.txt found; pass one with --path");
        std::process::exit(1);
    };
    config.log_path = Some(log_path.clone());
    if let Err(err) = config.save() {
        tracing::warn!("[CLI] could not save config: {err}");
    }

    let mut session = TrackerSession::new(&config);
    let mut replay = !cli.no_replay;
    if !cli.fresh {
        match persist::load(&config.state_file()) {
            Ok(Some(cache)) => {
                tracing::info!(
                    "[CLI] resuming from saved state ({} deaths on record)",
                    cache.global.deaths.total
                );
                session = session.with_cache(cache);
                // History is already counted; only new lines matter.
                replay = false;
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("[CLI] ignoring unreadable state file: {err}"),
        }
    }
    session.add_sink(Box::new(OverlayFileSink::new(config.output_dir.clone())));

    let mut tailer = LogTailer::new(log_path.clone());
    if !replay {
        tailer = tailer.skip_replay();
    }
    let (handle, mut rx) = tailer.start()?;
    tracing::info!("[CLI] watching {}", log_path.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = rx.recv() => match message {
                Some(message) => session.process_message(message),
                None => break,
            }
        }
    }

    handle.stop().await;
    tracing::info!("[CLI] stopped");
    Ok(())
}
