// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Default ceiling for uploads: 300 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 300 * 1024 * 1024;

/// Number of leading bytes read for signature inspection
pub const SIGNATURE_PROBE_LEN: usize = 8192;

/// Declared types accepted by default
pub fn default_allowed_mime_types() -> Vec<String> {
    ["video/mp4", "video/avi", "video/mov"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Container signatures accepted when content sniffing is enabled
const ACCEPTED_SIGNATURES: &[&str] = &[
    "video/mp4",
    "video/x-m4v",
    "video/quicktime",
    "video/x-msvideo",
];

/// Checks an upload's metadata before any processing is attempted
#[derive(Debug, Clone)]
pub struct UploadGatekeeper {
    allowed_mime_types: Vec<String>,
    max_size_bytes: u64,
}

impl UploadGatekeeper {
    pub fn new(allowed_mime_types: Vec<String>, max_size_bytes: u64) -> Self {
        Self {
            allowed_mime_types: allowed_mime_types
                .into_iter()
                .map(|m| m.trim().to_ascii_lowercase())
                .collect(),
            max_size_bytes,
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Pure predicate over declared type and size. The type check runs first,
    /// so an unsupported type is reported regardless of size.
    pub fn validate(&self, media: &UploadedMedia) -> Result<(), DomainError> {
        let mime = media.normalized_mime_type();
        if !self.allowed_mime_types.iter().any(|allowed| *allowed == mime) {
            return Err(DomainError::UnsupportedType(media.declared_mime_type.clone()));
        }

        if media.size_bytes > self.max_size_bytes {
            return Err(DomainError::TooLarge {
                size: media.size_bytes,
                limit: self.max_size_bytes,
            });
        }

        Ok(())
    }

    /// Check the leading bytes of the payload against known container signatures
    pub fn verify_signature(&self, head: &[u8]) -> Result<(), DomainError> {
        match infer::get(head) {
            Some(kind) if ACCEPTED_SIGNATURES.contains(&kind.mime_type()) => Ok(()),
            Some(kind) => Err(DomainError::UnsupportedType(format!(
                "content looks like {}",
                kind.mime_type()
            ))),
            None => Err(DomainError::UnsupportedType(
                "content signature not recognised".to_string(),
            )),
        }
    }
}

impl Default for UploadGatekeeper {
    fn default() -> Self {
        Self::new(default_allowed_mime_types(), DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Validates requested trim windows
pub struct TrimValidator;

impl TrimValidator {
    /// Reject empty or inverted ranges. Never clamps.
    pub fn validate(trim: &TrimRange) -> Result<(), DomainError> {
        let (start, end) = (trim.start_seconds(), trim.end_seconds());

        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::InvalidRange(
                "trim bounds must be finite".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::InvalidRange(format!(
                "start ({}) cannot be negative",
                start
            )));
        }
        // Written as a negated comparison so NaN can never slip through
        if !(end > start) {
            return Err(DomainError::InvalidRange(format!(
                "end ({}) must be greater than start ({})",
                end, start
            )));
        }

        Ok(())
    }

    /// `validate`, plus reject ranges ending past the known media duration
    pub fn validate_within(
        trim: &TrimRange,
        media_duration_seconds: Option<f64>,
    ) -> Result<(), DomainError> {
        Self::validate(trim)?;

        if let Some(duration) = media_duration_seconds {
            if duration.is_finite() && trim.end_seconds() > duration {
                return Err(DomainError::InvalidRange(format!(
                    "end ({}) exceeds media duration ({})",
                    trim.end_seconds(),
                    duration
                )));
            }
        }

        Ok(())
    }
}

/// Maps the client-supplied `lang` field onto a supported locale
#[derive(Debug, Clone)]
pub struct LocalePolicy {
    supported: Vec<Locale>,
    default: Locale,
}

impl LocalePolicy {
    pub fn new(supported: Vec<Locale>, default: Locale) -> Self {
        Self { supported, default }
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// Unknown or missing codes fall back to the default locale
    pub fn resolve(&self, lang: Option<&str>) -> Locale {
        lang.and_then(Locale::new)
            .filter(|locale| self.supported.contains(locale))
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Default for LocalePolicy {
    fn default() -> Self {
        Self {
            supported: vec![Locale::known("en"), Locale::known("tc")],
            default: Locale::known("tc"),
        }
    }
}
