//! Prefcast diagnostic CLI.
//!
//! Detects OS accessibility signals, runs the full initialization sequence
//! against a logging presentation port, and prints the effective preference
//! state. `prefcast reset` restores OS-derived defaults first; `prefcast
//! watch` keeps running and ingests live signal changes.

use anyhow::Result;
use prefcast::{AccessibilityContext, FileStorage, LoggingPort, SystemSignals};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Prefcast v{}", env!("CARGO_PKG_VERSION"));

    let context = AccessibilityContext::new(
        Arc::new(SystemSignals::new()),
        Box::new(FileStorage::new()),
        Arc::new(LoggingPort),
    );

    context.initialize().await;

    let command = std::env::args().nth(1);
    match command.as_deref() {
        Some("reset") => {
            context.store().reset_to_defaults().await;
            println!("{}", context.store().export_preferences());
        }
        Some("watch") => {
            let signal_loop = context.spawn_signal_loop();
            tracing::info!("watching OS accessibility signals, Ctrl+C to stop");
            signal_loop.await?;
        }
        Some(other) => {
            anyhow::bail!("unknown command: {other} (expected \"reset\" or \"watch\")");
        }
        None => {
            println!("{}", context.store().export_preferences());
        }
    }

    Ok(())
}
