// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod exec_sandbox;
pub mod probe_ffprobe;
#[cfg(feature = "libav")]
pub mod probe_libav;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegTranscodeAdapter;
pub use exec_sandbox::{EncoderSandbox, SandboxTranscodeAdapter};
pub use probe_ffprobe::FfprobeAdapter;
#[cfg(feature = "libav")]
pub use probe_libav::ProbeLibavAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
