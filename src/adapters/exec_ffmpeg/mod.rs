//! FFmpeg execution adapter for the remote deployment
//!
//! Artifacts are written to `<public_dir>/<locale>/<directory_name>/<name>` and
//! reported by the URL path under which the public directory is served.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{EncoderRunner, FfmpegCommand};
use crate::planner::{TranscodePlan, TranscodePlanner};
use crate::ports::*;

/// Runs the encoder next to the HTTP surface and persists the result
pub struct FfmpegTranscodeAdapter {
    runner: EncoderRunner,
    planner: TranscodePlanner,
    public_dir: PathBuf,
    directory_name: String,
    spool_dir: Option<PathBuf>,
    threads: Option<usize>,
}

impl FfmpegTranscodeAdapter {
    pub fn new(
        runner: EncoderRunner,
        planner: TranscodePlanner,
        public_dir: impl Into<PathBuf>,
        directory_name: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            planner,
            public_dir: public_dir.into(),
            directory_name: directory_name.into(),
            spool_dir: None,
            threads: None,
        }
    }

    /// Where in-memory payloads are staged before encoding
    pub fn with_spool_dir(mut self, spool_dir: Option<PathBuf>) -> Self {
        self.spool_dir = spool_dir;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Give the encoder a file path for the payload.
    ///
    /// Payloads already on disk are used in place; buffered ones are written to a
    /// temporary file that lives as long as the returned guard.
    async fn stage_input(
        &self,
        payload: &MediaPayload,
    ) -> Result<(PathBuf, Option<TempPath>), TranscodeError> {
        if let Some(path) = payload.path() {
            return Ok((path.to_path_buf(), None));
        }

        let staged = match &self.spool_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| TranscodeError::without_diagnostics(format!("failed to stage input: {}", e)))?
        .into_temp_path();

        payload
            .copy_to(&staged)
            .await
            .map_err(|e| TranscodeError::without_diagnostics(format!("failed to stage input: {}", e)))?;

        Ok((staged.to_path_buf(), Some(staged)))
    }

    /// Claim the next free artifact name with an empty placeholder.
    ///
    /// Names already on disk, left by an earlier process or another instance
    /// sharing the public directory, are skipped and never touched.
    async fn reserve_artifact(
        &self,
        request: &TranscodeRequest,
        output_dir: &Path,
    ) -> Result<(TranscodePlan, PathBuf), TranscodeError> {
        loop {
            let plan = self.planner.plan(request);
            let path = output_dir.join(&plan.artifact_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok((plan, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("Artifact name {} is taken", plan.artifact_name);
                }
                Err(e) => {
                    return Err(TranscodeError::without_diagnostics(format!(
                        "failed to reserve {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
    }

    fn artifact_url(&self, locale: &str, file_name: &str) -> String {
        format!("/{}/{}/{}", locale, self.directory_name, file_name)
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove partial artifact {}: {}", path.display(), e);
        }
    }
}

/// Name of the file the encoder writes before it is moved over the reservation
fn partial_name(artifact_name: &str) -> String {
    format!(".tmp_{}", artifact_name)
}

/// Run the encoder into `partial_path`, then move the result over the reserved
/// `output_path`. Both files belong to this call and are removed on failure.
async fn encode_and_publish(
    runner: EncoderRunner,
    command: FfmpegCommand,
    partial_path: PathBuf,
    output_path: PathBuf,
) -> Result<(), TranscodeError> {
    let outcome = match runner.run(&command, None).await {
        Ok(()) => tokio::fs::rename(&partial_path, &output_path)
            .await
            .map_err(|e| {
                TranscodeError::without_diagnostics(format!(
                    "failed to publish {}: {}",
                    output_path.display(),
                    e
                ))
            }),
        Err(err) => Err(err),
    };

    if outcome.is_err() {
        discard_partial(&partial_path).await;
        discard_partial(&output_path).await;
    }
    outcome
}

#[async_trait]
impl TranscodePort for FfmpegTranscodeAdapter {
    async fn invoke(&self, request: TranscodeRequest) -> Result<TranscodeResult, TranscodeError> {
        let output_dir = self
            .public_dir
            .join(request.locale.as_str())
            .join(&self.directory_name);
        tokio::fs::create_dir_all(&output_dir).await.map_err(|e| {
            TranscodeError::without_diagnostics(format!(
                "failed to create {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let (input_path, staged) = self.stage_input(&request.media.content).await?;
        let (plan, output_path) = self.reserve_artifact(&request, &output_dir).await?;
        if let Ok(json) = serde_json::to_string(&plan) {
            debug!(plan = %json, "Planned transcode");
        }

        let partial_path = output_dir.join(partial_name(&plan.artifact_name));
        let command = plan.command(&input_path, &partial_path, self.threads);
        let trim = request.trim;
        let original_mime_type = request.media.declared_mime_type.clone();

        // The encode owns its inputs and outlives an abandoned request
        let media = request.media;
        let runner = self.runner.clone();
        let published = output_path.clone();
        let encode = tokio::spawn(async move {
            let outcome = encode_and_publish(runner, command, partial_path, published).await;
            drop((staged, media));
            outcome
        });
        encode.await.map_err(|e| {
            TranscodeError::without_diagnostics(format!("encoder task failed: {}", e))
        })??;

        let metadata = tokio::fs::metadata(&output_path).await.map_err(|e| {
            TranscodeError::without_diagnostics(format!("encoder produced no output: {}", e))
        })?;

        info!(
            "Persisted {} ({} bytes, {}s of {})",
            output_path.display(),
            metadata.len(),
            plan.clip_duration_seconds,
            original_mime_type
        );

        Ok(TranscodeResult {
            output_location: ArtifactLocation::Persisted {
                url: self.artifact_url(&plan.locale, &plan.artifact_name),
                path: output_path,
            },
            file_name: plan.artifact_name,
            output_size_bytes: metadata.len(),
            duration_seconds: trim.duration_seconds(),
            original_mime_type,
            output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            processing_time_seconds: None,
        })
    }

    fn variant(&self) -> Variant {
        Variant::Remote
    }
}
