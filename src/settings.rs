//! Service settings and their validation

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{EncodingPreset, Locale};
use crate::domain::rules::{
    default_allowed_mime_types, LocalePolicy, UploadGatekeeper, DEFAULT_MAX_UPLOAD_BYTES,
};
use crate::error::{ReelcutError, ReelcutResult};
use crate::planner::naming::DEFAULT_FILE_SUFFIX;
use crate::ports::Variant;
use crate::utils::default_thread_count;

/// Highest CRF libx264 accepts
pub const MAX_CRF: u8 = 51;

/// Complete settings tree, mirroring the TOML layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub locale: LocaleSettings,
    pub encoder: EncoderSettings,
    pub presets: PresetSettings,
    pub output: OutputSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub bind: String,
    /// Directory served statically; persisted artifacts are written below it
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub allowed_mime_types: Vec<String>,
    /// Inclusive size ceiling in bytes
    pub max_size_bytes: u64,
    /// Inspect leading bytes for a known container signature
    pub sniff_content: bool,
    /// Probe uploads for their duration and bound the trim end by it
    pub probe_duration: bool,
    /// Where uploads are spooled; system temp dir when unset
    pub spool_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    pub supported: Vec<String>,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Encoder threads; sized to the host when unset
    pub threads: Option<usize>,
    /// Parent directory for per-request sandboxes
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetSettings {
    pub remote: EncodingPreset,
    pub local: EncodingPreset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory under `<public_dir>/<locale>/` receiving persisted artifacts
    pub directory_name: String,
    pub file_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `reelcut=debug,tower_http=info`
    pub level: String,
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            allowed_mime_types: default_allowed_mime_types(),
            max_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sniff_content: true,
            probe_duration: false,
            spool_dir: None,
        }
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string(), "tc".to_string()],
            default: "tc".to_string(),
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            threads: None,
            scratch_dir: None,
        }
    }
}

impl Default for PresetSettings {
    fn default() -> Self {
        Self {
            remote: EncodingPreset::remote_default(),
            local: EncodingPreset::local_default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory_name: "optimized-videos".to_string(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Reject settings the service cannot run with
    pub fn validate(&self) -> ReelcutResult<()> {
        if self.upload.max_size_bytes == 0 {
            return Err(ReelcutError::invalid_config(
                "upload.max_size_bytes must be greater than zero",
            ));
        }
        if self.upload.allowed_mime_types.is_empty() {
            return Err(ReelcutError::invalid_config(
                "upload.allowed_mime_types must not be empty",
            ));
        }

        validate_preset("presets.remote", &self.presets.remote)?;
        validate_preset("presets.local", &self.presets.local)?;

        self.locale_policy()?;

        if !is_path_segment(&self.output.directory_name) {
            return Err(ReelcutError::invalid_config(format!(
                "output.directory_name must be a single path segment, got {:?}",
                self.output.directory_name
            )));
        }
        if self.output.file_suffix.is_empty()
            || self.output.file_suffix.contains(['/', '\\'])
        {
            return Err(ReelcutError::invalid_config(format!(
                "output.file_suffix must be a non-empty file name suffix, got {:?}",
                self.output.file_suffix
            )));
        }

        if self.encoder.threads == Some(0) {
            return Err(ReelcutError::invalid_config(
                "encoder.threads must be at least 1",
            ));
        }

        Ok(())
    }

    /// Locale policy built from `[locale]`
    pub fn locale_policy(&self) -> ReelcutResult<LocalePolicy> {
        let mut supported = Vec::with_capacity(self.locale.supported.len());
        for code in &self.locale.supported {
            let locale = Locale::new(code).ok_or_else(|| {
                ReelcutError::invalid_config(format!("invalid locale code {:?}", code))
            })?;
            supported.push(locale);
        }

        let default = Locale::new(&self.locale.default).ok_or_else(|| {
            ReelcutError::invalid_config(format!(
                "invalid default locale {:?}",
                self.locale.default
            ))
        })?;
        if !supported.contains(&default) {
            return Err(ReelcutError::invalid_config(format!(
                "default locale '{}' is not listed in locale.supported",
                default
            )));
        }

        Ok(LocalePolicy::new(supported, default))
    }

    pub fn gatekeeper(&self) -> UploadGatekeeper {
        UploadGatekeeper::new(
            self.upload.allowed_mime_types.clone(),
            self.upload.max_size_bytes,
        )
    }

    pub fn preset(&self, variant: Variant) -> &EncodingPreset {
        match variant {
            Variant::Remote => &self.presets.remote,
            Variant::Local => &self.presets.local,
        }
    }

    /// Configured thread count, or one sized to the host
    pub fn effective_threads(&self) -> usize {
        self.encoder.threads.unwrap_or_else(default_thread_count)
    }
}

fn validate_preset(name: &str, preset: &EncodingPreset) -> ReelcutResult<()> {
    if preset.crf > MAX_CRF {
        return Err(ReelcutError::invalid_config(format!(
            "{}.crf must be at most {}, got {}",
            name, MAX_CRF, preset.crf
        )));
    }
    // libx264 with 4:2:0 chroma needs even dimensions
    for (axis, value) in [("width", preset.width), ("height", preset.height)] {
        if value == 0 || value % 2 != 0 {
            return Err(ReelcutError::invalid_config(format!(
                "{}.{} must be a positive even number, got {}",
                name, axis, value
            )));
        }
    }
    if preset.audio_bitrate_kbps == 0 {
        return Err(ReelcutError::invalid_config(format!(
            "{}.audio_bitrate_kbps must be greater than zero",
            name
        )));
    }
    if preset.frame_rate == Some(0) {
        return Err(ReelcutError::invalid_config(format!(
            "{}.frame_rate must be greater than zero",
            name
        )));
    }
    Ok(())
}

fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\'])
}
