//! FFprobe adapter for media duration lookup

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::error::{ReelcutError, ReelcutResult};
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Runs an `ffprobe` binary as a subprocess
pub struct FfprobeAdapter {
    program: PathBuf,
}

impl FfprobeAdapter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `configured` on `PATH`
    pub fn locate(configured: &str) -> ReelcutResult<Self> {
        let program = which::which(configured).map_err(|e| ReelcutError::EncoderNotFound {
            configured: configured.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(program))
    }
}

/// Extract `format.duration` from ffprobe's JSON output
fn parse_duration(stdout: &[u8]) -> Result<f64, DomainError> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| DomainError::Internal(format!("unreadable probe output: {}", e)))?;

    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            DomainError::UnsupportedType("media reports no usable duration".to_string())
        })?;

    Ok(duration)
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError> {
        debug!("Probing {}", path.display());

        let output = Command::new(&self.program)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::Internal(format!("failed to launch ffprobe: {}", e)))?;

        if !output.status.success() {
            // ffprobe only fails on input it cannot demux
            return Err(DomainError::UnsupportedType(format!(
                "media could not be probed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_duration(&output.stdout)
    }
}
