//! Tracing setup for the binary and for tests that want log output

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING: OnceCell<()> = OnceCell::new();

/// Install the global subscriber once. Later calls are no-ops.
///
/// `RUST_LOG` wins over `level` when set. `json` switches the fmt layer to
/// one JSON object per line.
pub fn init_tracing(level: &str, json: bool) -> Result<()> {
    TRACING
        .get_or_try_init(|| {
            let level: tracing::Level = level.parse().context("Invalid log level")?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
            let registry = tracing_subscriber::registry().with(filter);
            let installed = if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                    .try_init()
            } else {
                registry
                    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                    .try_init()
            };
            // Another subscriber may already be installed by a host or test harness.
            if let Err(err) = installed {
                tracing::debug!(error = %err, "global subscriber already set");
            }
            Ok(())
        })
        .map(|_| ())
}
