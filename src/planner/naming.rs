//! Artifact file naming

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Default suffix appended to every artifact name
pub const DEFAULT_FILE_SUFFIX: &str = "-optimized.mp4";

/// Generates `<millis><suffix>` names that are strictly increasing within a process.
///
/// Two requests landing in the same millisecond get consecutive stamps instead
/// of the same name.
#[derive(Debug)]
pub struct ArtifactNamer {
    suffix: String,
    last_stamp: AtomicI64,
}

impl ArtifactNamer {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Reserve the next name
    pub fn next_name(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_stamp.load(Ordering::Acquire);
        loop {
            let stamp = now.max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                stamp,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return format!("{}{}", stamp, self.suffix),
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for ArtifactNamer {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_SUFFIX)
    }
}
