//! Reelcut
//!
//! Trims uploaded video clips to a time window and re-encodes them to
//! H.264/AAC at a fixed portrait geometry.
//!
//! # Usage
//!
//! ```bash
//! reelcut serve --bind 0.0.0.0:3000 --public-dir public
//! reelcut transcode --input clip.mov --start 2 --end 5 --output short.mp4
//! reelcut probe --input clip.mov
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use reelcut::adapters::TracingLogAdapter;
use reelcut::cli::{commands, Cli, Commands};
use reelcut::config_initialization::initialize_configuration_hierarchy;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli.config_overrides())?;
    TracingLogAdapter::init(&loaded.settings.logging)?;

    match &loaded.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    if !loaded.env_overrides.is_empty() {
        debug!("Environment overrides: {}", loaded.env_overrides.join(", "));
    }

    let settings = loaded.settings;
    match cli.command {
        Commands::Serve(_) => commands::serve(settings).await?,
        Commands::Transcode(args) => commands::transcode(args, settings).await?,
        Commands::Probe(args) => commands::probe(args, settings).await?,
    }

    Ok(())
}
