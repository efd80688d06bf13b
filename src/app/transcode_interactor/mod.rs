// Transcode interactor - Orchestrates the trim-and-optimize use case

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Validates a submission and hands it to the encoder port.
///
/// Checks run in a fixed order and the first failure wins: missing file,
/// declared type and size, content signature, trim range, duration bound.
/// The port is invoked only when every check passed.
pub struct TranscodeInteractor {
    transcoder: Arc<dyn TranscodePort>,
    gatekeeper: UploadGatekeeper,
    locale_policy: LocalePolicy,
    geometry: OutputGeometry,
    sniff_content: bool,
    probe: Option<Arc<dyn ProbePort>>,
}

impl TranscodeInteractor {
    /// Create new transcode interactor with injected ports
    pub fn new(
        transcoder: Arc<dyn TranscodePort>,
        gatekeeper: UploadGatekeeper,
        locale_policy: LocalePolicy,
        geometry: OutputGeometry,
    ) -> Self {
        Self {
            transcoder,
            gatekeeper,
            locale_policy,
            geometry,
            sniff_content: true,
            probe: None,
        }
    }

    pub fn with_content_sniffing(mut self, enabled: bool) -> Self {
        self.sniff_content = enabled;
        self
    }

    /// Probe uploads on disk for their duration and bound the trim end by it
    pub fn with_probe(mut self, probe: Option<Arc<dyn ProbePort>>) -> Self {
        self.probe = probe;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.gatekeeper.max_size_bytes()
    }

    pub fn variant(&self) -> Variant {
        self.transcoder.variant()
    }

    /// Run one submission to completion
    pub async fn execute(&self, submission: TranscodeSubmission) -> Result<TranscodeResult, DomainError> {
        let request = match self.validate(submission).await {
            Ok(request) => request,
            Err(err) => {
                warn!("Rejected submission: {}", err);
                return Err(err);
            }
        };

        info!(
            "Transcoding {} ({} bytes) {} at {} for locale {}",
            request.media.file_name.as_deref().unwrap_or("upload"),
            request.media.size_bytes,
            request.trim,
            request.geometry,
            request.locale
        );

        let result = self.transcoder.invoke(request).await?;

        info!(
            "Produced {} ({} bytes) at {}",
            result.file_name,
            result.output_size_bytes,
            result.output_location.locator()
        );
        Ok(result)
    }

    async fn validate(&self, submission: TranscodeSubmission) -> Result<TranscodeRequest, DomainError> {
        let TranscodeSubmission {
            media,
            trim_start,
            trim_end,
            lang,
            media_duration,
        } = submission;

        let media = media.ok_or(DomainError::MissingFile)?;

        self.gatekeeper.validate(&media)?;

        if self.sniff_content {
            let head = media
                .content
                .head(SIGNATURE_PROBE_LEN)
                .await
                .map_err(|e| DomainError::Internal(format!("failed to read upload: {}", e)))?;
            self.gatekeeper.verify_signature(&head)?;
        }

        let trim = TrimRange::from_fields(trim_start.as_deref(), trim_end.as_deref())?;
        TrimValidator::validate(&trim)?;

        let known_duration = self.known_duration(&media, media_duration.as_deref()).await?;
        TrimValidator::validate_within(&trim, known_duration)?;

        let locale = self.locale_policy.resolve(lang.as_deref());

        Ok(TranscodeRequest {
            media,
            trim,
            geometry: self.geometry,
            locale,
        })
    }

    /// Duration supplied by the caller, else probed when a probe is configured
    async fn known_duration(
        &self,
        media: &UploadedMedia,
        supplied: Option<&str>,
    ) -> Result<Option<f64>, DomainError> {
        if let Some(value) = supplied.map(str::trim).filter(|v| !v.is_empty()) {
            let seconds = TimeSpec::parse(value)
                .map_err(|_| DomainError::InvalidRange(format!("invalid media duration: {:?}", value)))?;
            return Ok(Some(seconds.seconds));
        }

        match (&self.probe, media.content.path()) {
            (Some(probe), Some(path)) => {
                let seconds = probe.probe_duration(path).await?;
                debug!("Probed duration {}s", seconds);
                Ok(Some(seconds))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests;
