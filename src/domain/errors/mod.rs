// Domain errors - Error types for the domain layer

use std::fmt;

/// Failure reported by the external encoder.
///
/// `diagnostic_output` is the encoder's raw stderr, passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeError {
    pub message: String,
    pub diagnostic_output: String,
}

impl TranscodeError {
    /// Create a new transcode error
    pub fn new(message: impl Into<String>, diagnostic_output: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostic_output: diagnostic_output.into(),
        }
    }

    /// Error raised before the encoder produced any output of its own
    pub fn without_diagnostics(message: impl Into<String>) -> Self {
        Self::new(message, String::new())
    }
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TranscodeError {}

/// Domain-specific error types. Every variant is terminal for the request.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No media payload was supplied
    MissingFile,
    /// Declared or sniffed type is outside the allow-list
    UnsupportedType(String),
    /// Payload exceeds the size ceiling
    TooLarge { size: u64, limit: u64 },
    /// Trim range is empty, inverted, negative or unparseable
    InvalidRange(String),
    /// The encoder completed abnormally
    EncoderFailure(TranscodeError),
    /// Local I/O failed around the encoder call (spooling, scratch space)
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::MissingFile => write!(f, "No video file provided"),
            DomainError::UnsupportedType(mime) => write!(f, "Unsupported file type: {}", mime),
            DomainError::TooLarge { size, limit } => {
                write!(f, "File is too large: {} bytes exceeds {} bytes", size, limit)
            }
            DomainError::InvalidRange(msg) => write!(f, "Invalid trim range: {}", msg),
            DomainError::EncoderFailure(err) => write!(f, "Encoder failure: {}", err),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<TranscodeError> for DomainError {
    fn from(err: TranscodeError) -> Self {
        DomainError::EncoderFailure(err)
    }
}
