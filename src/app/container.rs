use std::sync::Arc;

use tracing::info;

use crate::adapters::{FfmpegTranscodeAdapter, SandboxTranscodeAdapter};
use crate::app::transcode_interactor::TranscodeInteractor;
use crate::engine::EncoderRunner;
use crate::error::ReelcutResult;
use crate::planner::{ArtifactNamer, TranscodePlanner};
use crate::ports::{ProbePort, TranscodePort, Variant};
use crate::settings::Settings;

pub trait AppContainer: Send + Sync {
    fn settings(&self) -> &Settings;
    fn transcode_interactor(&self, variant: Variant) -> ReelcutResult<Arc<TranscodeInteractor>>;
    fn probe_port(&self) -> ReelcutResult<Arc<dyn ProbePort>>;
}

/// Wires adapters from validated settings. The encoder is resolved up front.
pub struct DefaultAppContainer {
    settings: Settings,
    runner: EncoderRunner,
    namer: Arc<ArtifactNamer>,
}

impl DefaultAppContainer {
    pub fn new(settings: Settings) -> ReelcutResult<Self> {
        settings.validate()?;
        let runner = EncoderRunner::locate(&settings.encoder.ffmpeg_path)?;
        info!("Using encoder {}", runner.program().display());

        Ok(Self {
            namer: Arc::new(ArtifactNamer::new(settings.output.file_suffix.clone())),
            runner,
            settings,
        })
    }

    /// Encoder port for a deployment variant
    pub fn transcoder(&self, variant: Variant) -> Arc<dyn TranscodePort> {
        let planner = TranscodePlanner::new(
            self.settings.preset(variant).clone(),
            Arc::clone(&self.namer),
        );
        let threads = Some(self.settings.effective_threads());

        match variant {
            Variant::Remote => Arc::new(
                FfmpegTranscodeAdapter::new(
                    self.runner.clone(),
                    planner,
                    self.settings.server.public_dir.clone(),
                    self.settings.output.directory_name.clone(),
                )
                .with_spool_dir(self.settings.upload.spool_dir.clone())
                .with_threads(threads),
            ),
            Variant::Local => Arc::new(
                SandboxTranscodeAdapter::new(self.runner.clone(), planner)
                    .with_scratch_dir(self.settings.encoder.scratch_dir.clone())
                    .with_threads(threads),
            ),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn transcode_interactor(&self, variant: Variant) -> ReelcutResult<Arc<TranscodeInteractor>> {
        let probe = if self.settings.upload.probe_duration {
            Some(self.probe_port()?)
        } else {
            None
        };

        let interactor = TranscodeInteractor::new(
            self.transcoder(variant),
            self.settings.gatekeeper(),
            self.settings.locale_policy()?,
            self.settings.preset(variant).geometry(),
        )
        .with_content_sniffing(self.settings.upload.sniff_content)
        .with_probe(probe);

        Ok(Arc::new(interactor))
    }

    fn probe_port(&self) -> ReelcutResult<Arc<dyn ProbePort>> {
        build_probe_port(&self.settings)
    }
}

/// Duration probe: in-process libav when built with it, else the ffprobe binary
#[cfg(feature = "libav")]
pub fn build_probe_port(_settings: &Settings) -> ReelcutResult<Arc<dyn ProbePort>> {
    Ok(Arc::new(crate::adapters::ProbeLibavAdapter::new()?))
}

/// Duration probe: in-process libav when built with it, else the ffprobe binary
#[cfg(not(feature = "libav"))]
pub fn build_probe_port(settings: &Settings) -> ReelcutResult<Arc<dyn ProbePort>> {
    Ok(Arc::new(crate::adapters::FfprobeAdapter::locate(
        &settings.encoder.ffprobe_path,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelcutError;

    #[test]
    fn test_missing_encoder_fails_fast() {
        let mut settings = Settings::default();
        settings.encoder.ffmpeg_path = "/nonexistent/reelcut-ffmpeg".to_string();

        match DefaultAppContainer::new(settings) {
            Err(ReelcutError::EncoderNotFound { configured, .. }) => {
                assert_eq!(configured, "/nonexistent/reelcut-ffmpeg")
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("container built without an encoder"),
        }
    }

    #[test]
    fn test_invalid_settings_rejected_before_resolution() {
        let mut settings = Settings::default();
        settings.presets.remote.crf = 99;
        assert!(matches!(
            DefaultAppContainer::new(settings),
            Err(ReelcutError::InvalidConfig { .. })
        ));
    }
}
