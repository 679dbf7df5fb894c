//! sandbox-tail entry point.
//!
//! Reads a file from a remote agent through its paging endpoint and prints
//! it to stdout. Logs go to stderr so they never mix with file content.
//!
//! ## Examples
//!
//! ```text
//! SANDBOX_AGENT_URL=http://10.0.0.5:5051 sandbox-tail tail /var/log/agent.log -n 20
//! SANDBOX_TASK_ID=web.1 SANDBOX_TASK_DIR=/var/lib/agent/runs/r1 sandbox-tail tail stdout -f
//! ```

mod command;
mod config;

use command::{Command, USAGE};
use config::TailConfig;
use sandbox_files::{File, HttpHost};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - logs go to stderr (stdout is file content)
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("sandbox_tail=info".parse()?)
                .add_directive("sandbox_files=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    // Load configuration from environment
    let config = TailConfig::from_env();
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");

    let host = Arc::new(HttpHost::new(config.host_config())?);
    let file = match config.task() {
        Some(task) => File::for_task(host, task, command.path()),
        None => File::new(host, command.path()),
    };
    let mut file = file.with_config(config.file_config()?);
    tracing::info!(file = %file, command = ?command, "Reading remote file");

    let mut stdout = std::io::stdout().lock();
    command::run(&command, &mut file, &mut stdout).await?;

    if let Command::Tail { follow: true, .. } = command {
        tokio::select! {
            result = command::follow(&mut file, &mut stdout, config.poll_interval) => result?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal, stopping");
            }
        }
    }

    Ok(())
}
