//! Transcode planning
//!
//! Turns a validated `TranscodeRequest` into the concrete encoder parameters
//! shared by both deployment variants.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::model::*;
use crate::engine::{FfmpegCommand, AUDIO_CODEC, VIDEO_CODEC};

pub mod naming;

pub use naming::ArtifactNamer;

/// Everything the encoder needs for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodePlan {
    /// Seek offset into the source, in seconds
    pub start_offset_seconds: f64,
    /// Length of the produced clip, in seconds
    pub clip_duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub crf: u8,
    pub frame_rate: Option<u32>,
    pub audio_bitrate_kbps: u32,
    /// Unique file name of the artifact
    pub artifact_name: String,
    pub locale: String,
}

impl TranscodePlan {
    pub fn geometry(&self) -> OutputGeometry {
        OutputGeometry::new(self.width, self.height)
    }

    /// Build the encoder invocation for this plan
    pub fn command(&self, input: &Path, output: &Path, threads: Option<usize>) -> FfmpegCommand {
        let mut command = FfmpegCommand::new(input, output)
            .seek(self.start_offset_seconds)
            .duration(self.clip_duration_seconds)
            .video_codec(VIDEO_CODEC)
            .crf(self.crf)
            .video_filter(self.geometry().scale_filter());

        if let Some(fps) = self.frame_rate {
            command = command.frame_rate(fps);
        }

        command = command
            .audio_codec(AUDIO_CODEC)
            .audio_bitrate(format!("{}k", self.audio_bitrate_kbps))
            .output_args(["-movflags", "+faststart"]);

        if let Some(threads) = threads {
            command = command.threads(threads);
        }

        command
    }
}

/// Combines a deployment preset with request parameters
#[derive(Debug, Clone)]
pub struct TranscodePlanner {
    preset: EncodingPreset,
    namer: Arc<ArtifactNamer>,
}

impl TranscodePlanner {
    pub fn new(preset: EncodingPreset, namer: Arc<ArtifactNamer>) -> Self {
        Self { preset, namer }
    }

    /// Plan a request. Each call reserves a fresh artifact name.
    pub fn plan(&self, request: &TranscodeRequest) -> TranscodePlan {
        TranscodePlan {
            start_offset_seconds: request.trim.start_seconds(),
            clip_duration_seconds: request.trim.duration_seconds(),
            width: request.geometry.width,
            height: request.geometry.height,
            crf: self.preset.crf,
            frame_rate: self.preset.frame_rate,
            audio_bitrate_kbps: self.preset.audio_bitrate_kbps,
            artifact_name: self.namer.next_name(),
            locale: request.locale.to_string(),
        }
    }
}
