//! Sandboxed execution adapter for the local deployment
//!
//! Each request gets its own scratch directory. The input is written into it,
//! the encoder runs with it as working directory, and the artifact is read back
//! into memory before the directory is removed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::EncoderRunner;
use crate::planner::TranscodePlanner;
use crate::ports::*;

/// Scheme of references to in-memory artifacts
pub const MEMORY_SCHEME: &str = "memory://";

/// Per-request scratch directory, removed on drop
#[derive(Debug)]
pub struct EncoderSandbox {
    dir: TempDir,
}

impl EncoderSandbox {
    /// Create a fresh sandbox under `root`, or the system temp dir
    pub fn acquire(root: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("reelcut-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Copy the payload into the sandbox under `name`
    pub async fn write_file(&self, name: &str, payload: &MediaPayload) -> std::io::Result<PathBuf> {
        let path = self.file(name);
        payload.copy_to(&path).await?;
        Ok(path)
    }

    pub async fn read_file(&self, name: &str) -> std::io::Result<Bytes> {
        tokio::fs::read(self.file(name)).await.map(Bytes::from)
    }
}

/// Sandbox file name for the input, keeping a plain extension when there is one
fn input_file_name(original: Option<&str>) -> String {
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("input.{}", ext),
        None => "input".to_string(),
    }
}

fn io_failure(context: &str, err: std::io::Error) -> TranscodeError {
    TranscodeError::without_diagnostics(format!("{}: {}", context, err))
}

/// Runs the encoder inside a throwaway sandbox and returns the artifact in memory
pub struct SandboxTranscodeAdapter {
    runner: EncoderRunner,
    planner: TranscodePlanner,
    scratch_dir: Option<PathBuf>,
    threads: Option<usize>,
}

impl SandboxTranscodeAdapter {
    pub fn new(runner: EncoderRunner, planner: TranscodePlanner) -> Self {
        Self {
            runner,
            planner,
            scratch_dir: None,
            threads: None,
        }
    }

    pub fn with_scratch_dir(mut self, scratch_dir: Option<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }
}

#[async_trait]
impl TranscodePort for SandboxTranscodeAdapter {
    async fn invoke(&self, request: TranscodeRequest) -> Result<TranscodeResult, TranscodeError> {
        let started = Instant::now();
        let plan = self.planner.plan(&request);

        let sandbox = EncoderSandbox::acquire(self.scratch_dir.as_deref())
            .map_err(|e| io_failure("failed to create encoder sandbox", e))?;
        debug!("Acquired sandbox {}", sandbox.path().display());

        let input_name = input_file_name(request.media.file_name.as_deref());
        let input_path = sandbox
            .write_file(&input_name, &request.media.content)
            .await
            .map_err(|e| io_failure("failed to write input into sandbox", e))?;
        let output_path = sandbox.file(&plan.artifact_name);

        let command = plan.command(&input_path, &output_path, self.threads);
        self.runner.run(&command, Some(sandbox.path())).await?;

        let data = sandbox
            .read_file(&plan.artifact_name)
            .await
            .map_err(|e| io_failure("encoder produced no output", e))?;
        drop(sandbox);

        let processing_time = started.elapsed().as_secs_f64();
        info!(
            "Encoded {} in memory ({} bytes, {:.2}s)",
            plan.artifact_name,
            data.len(),
            processing_time
        );

        Ok(TranscodeResult {
            output_size_bytes: data.len() as u64,
            output_location: ArtifactLocation::InMemory {
                reference: format!("{}{}", MEMORY_SCHEME, plan.artifact_name),
                data,
            },
            file_name: plan.artifact_name,
            duration_seconds: request.trim.duration_seconds(),
            original_mime_type: request.media.declared_mime_type,
            output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            processing_time_seconds: Some(processing_time),
        })
    }

    fn variant(&self) -> Variant {
        Variant::Local
    }
}
