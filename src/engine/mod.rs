//! Encoder engine: command construction and subprocess execution
//!
//! The encoder is an external `ffmpeg` binary. `FfmpegCommand` assembles its
//! argument vector; `EncoderRunner` spawns it and turns a non-zero exit into a
//! `TranscodeError` carrying the unfiltered stderr.

pub mod command;
pub mod runner;

pub use command::FfmpegCommand;
pub use runner::EncoderRunner;

/// Video codec used for every artifact
pub const VIDEO_CODEC: &str = "libx264";

/// Audio codec used for every artifact
pub const AUDIO_CODEC: &str = "aac";
