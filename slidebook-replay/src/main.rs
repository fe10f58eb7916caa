//! # Slidebook Replay
//!
//! Headless replay of scripted input against a slide deck.

use std::io::Write;

use clap::Parser;
use slidebook_replay::{run, CliArgs, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout stays machine-readable
    let json = args.log_json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slidebook_replay=info,slidebook_core=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let print_frames = args.frames;
    let config = ReplayConfig::try_from(args)?;

    tracing::info!(
        "Replaying {} at {}x{}, {} fps",
        config.script.display(),
        config.width,
        config.height,
        config.fps
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;
    let report = run(&config, |frame| {
        if !print_frames || write_error.is_some() {
            return;
        }
        let line = serde_json::to_string(frame).map_err(anyhow::Error::from);
        if let Err(e) = line.and_then(|l| writeln!(out, "{l}").map_err(anyhow::Error::from)) {
            write_error = Some(e);
        }
    })?;
    if let Some(e) = write_error {
        return Err(e);
    }

    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
