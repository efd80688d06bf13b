// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;

use crate::domain::errors::DomainError;

/// MIME type of every artifact the encoder produces
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse a time field: plain seconds (`"2.5"`), `MM:SS.ms` or `HH:MM:SS.ms`
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(DomainError::InvalidRange(format!(
                    "time is not a finite number: {}",
                    trimmed
                )));
            }
            if seconds < 0.0 {
                return Err(DomainError::InvalidRange("time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0, parse_component(m, "minutes")?, parse_seconds(s)?),
            [h, m, s] => {
                let minutes = parse_component(m, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::InvalidRange(
                        "minutes must be less than 60".to_string(),
                    ));
                }
                (parse_component(h, "hours")?, minutes, parse_seconds(s)?)
            }
            _ => {
                return Err(DomainError::InvalidRange(format!(
                    "unrecognised time value: {:?}",
                    trimmed
                )))
            }
        };

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds_part,
        ))
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
        }
    }
}

fn parse_component(value: &str, what: &str) -> Result<u32, DomainError> {
    value
        .parse::<u32>()
        .map_err(|_| DomainError::InvalidRange(format!("invalid {} value: {:?}", what, value)))
}

fn parse_seconds(value: &str) -> Result<f64, DomainError> {
    let seconds = value
        .parse::<f64>()
        .map_err(|_| DomainError::InvalidRange(format!("invalid seconds value: {:?}", value)))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(DomainError::InvalidRange(
            "seconds must be within [0, 60)".to_string(),
        ));
    }
    Ok(seconds)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// The `[start, end)` window of the source media to keep.
///
/// Construction does not validate; `TrimValidator` decides whether a range is acceptable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl TrimRange {
    /// Create a trim range from seconds
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: TimeSpec::from_seconds(start),
            end: TimeSpec::from_seconds(end),
        }
    }

    /// Parse the `trimStart` / `trimEnd` form fields, both defaulting to `"0"`
    pub fn from_fields(start: Option<&str>, end: Option<&str>) -> Result<Self, DomainError> {
        let start = TimeSpec::parse(non_empty_or_zero(start))?;
        let end = TimeSpec::parse(non_empty_or_zero(end))?;
        Ok(Self { start, end })
    }

    /// Start offset in seconds
    pub fn start_seconds(&self) -> f64 {
        self.start.seconds
    }

    /// End offset in seconds
    pub fn end_seconds(&self) -> f64 {
        self.end.seconds
    }

    /// Clip length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.end.seconds - self.start.seconds
    }
}

fn non_empty_or_zero(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "0",
    }
}

impl fmt::Display for TrimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Where the bytes of an upload currently live
#[derive(Debug)]
pub enum MediaPayload {
    /// Held in memory
    Buffered(Bytes),
    /// Streamed to a temporary file that is removed on drop
    Spooled(NamedTempFile),
    /// A caller-owned file, read but never modified
    OnDisk(PathBuf),
}

impl MediaPayload {
    /// Filesystem path of the payload, if it has one
    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaPayload::Buffered(_) => None,
            MediaPayload::Spooled(file) => Some(file.path()),
            MediaPayload::OnDisk(path) => Some(path.as_path()),
        }
    }

    /// Read up to `len` leading bytes for signature inspection
    pub async fn head(&self, len: usize) -> std::io::Result<Vec<u8>> {
        match self {
            MediaPayload::Buffered(bytes) => Ok(bytes[..bytes.len().min(len)].to_vec()),
            MediaPayload::Spooled(file) => read_head(file.path(), len).await,
            MediaPayload::OnDisk(path) => read_head(path, len).await,
        }
    }

    /// Write a copy of the payload to `dest`
    pub async fn copy_to(&self, dest: &Path) -> std::io::Result<()> {
        match self {
            MediaPayload::Buffered(bytes) => tokio::fs::write(dest, bytes).await,
            MediaPayload::Spooled(file) => tokio::fs::copy(file.path(), dest).await.map(|_| ()),
            MediaPayload::OnDisk(path) => tokio::fs::copy(path, dest).await.map(|_| ()),
        }
    }
}

async fn read_head(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut head).await?;
    Ok(head)
}

/// An upload as received from a client
#[derive(Debug)]
pub struct UploadedMedia {
    pub file_name: Option<String>,
    pub declared_mime_type: String,
    pub size_bytes: u64,
    pub content: MediaPayload,
}

impl UploadedMedia {
    /// Wrap an in-memory payload
    pub fn buffered(file_name: Option<String>, declared_mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name,
            declared_mime_type: declared_mime_type.into(),
            size_bytes: data.len() as u64,
            content: MediaPayload::Buffered(data),
        }
    }

    /// Declared MIME type with parameters stripped and lower-cased
    pub fn normalized_mime_type(&self) -> String {
        self.declared_mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }
}

/// Language segment used to partition persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Accepts short ASCII language codes only, so the value is always a safe path segment
    pub fn new(code: &str) -> Option<Self> {
        let code = code.trim();
        let valid = !code.is_empty()
            && code.len() <= 16
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(code.to_ascii_lowercase()))
    }

    pub(crate) fn known(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed output frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
}

impl OutputGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Encoder scale filter for this geometry
    pub fn scale_filter(&self) -> String {
        format!("scale={}:{}", self.width, self.height)
    }
}

impl fmt::Display for OutputGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Deployment preset: output geometry plus the re-encode knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingPreset {
    pub width: u32,
    pub height: u32,
    /// Constant rate factor for libx264 (0-51, lower is higher quality)
    pub crf: u8,
    pub audio_bitrate_kbps: u32,
    #[serde(default)]
    pub frame_rate: Option<u32>,
}

impl EncodingPreset {
    /// Preset used by the server-side deployment
    pub fn remote_default() -> Self {
        Self {
            width: 480,
            height: 854,
            crf: 28,
            audio_bitrate_kbps: 128,
            frame_rate: None,
        }
    }

    /// Preset used by the in-process deployment
    pub fn local_default() -> Self {
        Self {
            width: 720,
            height: 1280,
            crf: 18,
            audio_bitrate_kbps: 48,
            frame_rate: Some(18),
        }
    }

    pub fn geometry(&self) -> OutputGeometry {
        OutputGeometry::new(self.width, self.height)
    }
}

/// Raw inputs collected from a client before any validation
#[derive(Debug, Default)]
pub struct TranscodeSubmission {
    pub media: Option<UploadedMedia>,
    pub trim_start: Option<String>,
    pub trim_end: Option<String>,
    pub lang: Option<String>,
    /// Duration of the source as known to the caller, in seconds
    pub media_duration: Option<String>,
}

/// One-shot request handed to a transcode port. The media is consumed.
#[derive(Debug)]
pub struct TranscodeRequest {
    pub media: UploadedMedia,
    pub trim: TrimRange,
    pub geometry: OutputGeometry,
    pub locale: Locale,
}

/// Where a produced artifact can be found
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactLocation {
    /// Written to disk and reachable by URL
    Persisted { path: PathBuf, url: String },
    /// Held in memory behind a locally resolvable reference
    InMemory { reference: String, data: Bytes },
}

impl ArtifactLocation {
    /// URL for persisted artifacts, reference string for in-memory ones
    pub fn locator(&self) -> &str {
        match self {
            ArtifactLocation::Persisted { url, .. } => url,
            ArtifactLocation::InMemory { reference, .. } => reference,
        }
    }
}

/// Outcome of a successful transcode
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeResult {
    pub output_location: ArtifactLocation,
    pub file_name: String,
    pub output_size_bytes: u64,
    /// Echoes the requested trim duration
    pub duration_seconds: f64,
    pub original_mime_type: String,
    pub output_mime_type: String,
    /// Wall time of the encode; only reported by the in-process variant
    pub processing_time_seconds: Option<f64>,
}
