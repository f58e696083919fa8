//! Subscriber setup: console output plus an optional run log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "cinetag=debug,cinetag_av=debug,cinetag_parser=debug"
    } else {
        "cinetag=info,cinetag_av=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
}

/// Install the global subscriber.
///
/// With `log_file`, every event is also appended to that file without ANSI
/// colors.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    // stdout is reserved for command output
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter(verbose));

    let file = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(env_filter(verbose)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install the log subscriber")?;
    Ok(())
}
