// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Deployment variant of the transcode service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Encoder runs beside the HTTP surface; artifacts are persisted and served by URL
    Remote,
    /// Encoder runs in a per-request sandbox; the artifact is returned in memory
    Local,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Remote => "remote",
            Variant::Local => "local",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Variant::Remote),
            "local" => Ok(Variant::Local),
            other => Err(format!("unknown variant '{}', expected local or remote", other)),
        }
    }
}

/// Port for the encoder. One invocation per request; no retries.
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Trim and re-encode `request.media`, consuming the request
    async fn invoke(&self, request: TranscodeRequest) -> Result<TranscodeResult, TranscodeError>;

    /// Which deployment this adapter implements
    fn variant(&self) -> Variant;
}

/// Port for media duration lookup
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container duration in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError>;
}
