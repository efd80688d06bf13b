//! CLI module for reelcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

/// Reelcut video trimming service
///
/// Trims an uploaded clip to a time window and re-encodes it to H.264/AAC at a
/// fixed portrait geometry, either behind an HTTP endpoint or locally.
#[derive(Parser, Debug)]
#[command(name = "reelcut")]
#[command(about = "Reelcut - trim and optimize short videos")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: config/production.toml, config/development.toml, reelcut.toml)
    #[arg(long, global = true, env = "REELCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or tracing filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Encoder threads (1-64)
    #[arg(long, global = true, value_parser = args::parse_threads)]
    pub threads: Option<usize>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API and the produced artifacts
    Serve(args::ServeArgs),
    /// Trim and re-encode a file on disk
    Transcode(args::TranscodeArgs),
    /// Print the duration of a media file
    Probe(args::ProbeArgs),
}

impl Cli {
    /// Command-line values that take precedence over every other config source
    pub fn config_overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            config_path: self.config.clone(),
            log_level: self.log_level.clone(),
            log_json: self.log_json,
            threads: self.threads,
            ..Default::default()
        };

        if let Commands::Serve(args) = &self.command {
            overrides.bind = args.bind.clone();
            overrides.public_dir = args.public_dir.clone();
        }

        overrides
    }
}
