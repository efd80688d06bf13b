//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::ports::Variant;

/// Thread counts accepted on the command line
pub fn parse_threads(s: &str) -> Result<usize, String> {
    number_range(s, 1, 64)
}

/// Constant rate factor accepted by libx264
pub fn parse_crf(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory served statically and receiving artifacts
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
}

/// Arguments for the transcode command
#[derive(Args, Debug)]
pub struct TranscodeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long, default_value = "0")]
    pub start: String,

    /// End time (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long)]
    pub end: String,

    /// Declared MIME type (default: guessed from the extension)
    #[arg(long)]
    pub mime: Option<String>,

    /// Locale code of the output partition
    #[arg(long)]
    pub lang: Option<String>,

    /// Known duration of the input in seconds; the end time may not exceed it
    #[arg(long)]
    pub media_duration: Option<String>,

    /// Deployment variant: local (in-memory artifact) or remote (persisted under the public dir)
    #[arg(long, default_value = "local")]
    pub variant: Variant,

    /// Where to write the artifact of a local transcode
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the preset's constant rate factor (0-51)
    #[arg(long, value_parser = parse_crf)]
    pub crf: Option<u8>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
