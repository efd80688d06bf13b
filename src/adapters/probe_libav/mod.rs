// Probe LibAV adapter - In-process duration lookup using libav

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::error::{ReelcutError, ReelcutResult};
use crate::ports::*;

/// Opens the container with libav and reads its duration
pub struct ProbeLibavAdapter;

impl ProbeLibavAdapter {
    /// Initialize libav
    pub fn new() -> ReelcutResult<Self> {
        ffmpeg_next::init().map_err(|e| ReelcutError::LibavInit {
            message: e.to_string(),
        })?;
        Ok(Self)
    }
}

#[async_trait]
impl ProbePort for ProbeLibavAdapter {
    async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError> {
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let input = ffmpeg_next::format::input(&path).map_err(|e| {
                DomainError::UnsupportedType(format!("media could not be opened: {}", e))
            })?;

            let duration = input.duration();
            if duration <= 0 {
                return Err(DomainError::UnsupportedType(
                    "media reports no usable duration".to_string(),
                ));
            }

            Ok(duration as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE))
        })
        .await
        .map_err(|e| DomainError::Internal(format!("probe task failed: {}", e)))?
    }
}
