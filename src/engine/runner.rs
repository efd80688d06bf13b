//! Encoder subprocess runner

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::TranscodeError;
use crate::engine::command::FfmpegCommand;
use crate::error::{ReelcutError, ReelcutResult};

/// Spawns a resolved encoder binary
#[derive(Debug, Clone)]
pub struct EncoderRunner {
    program: PathBuf,
}

impl EncoderRunner {
    /// Wrap an already resolved program path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `configured` (a bare name looked up on `PATH`, or a path)
    pub fn locate(configured: &str) -> ReelcutResult<Self> {
        let program = which::which(configured).map_err(|e| ReelcutError::EncoderNotFound {
            configured: configured.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Resolved {} to {}", configured, program.display());
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `command` to completion.
    ///
    /// On a non-zero exit the encoder's stderr is returned verbatim as the diagnostic output.
    pub async fn run(
        &self,
        command: &FfmpegCommand,
        working_dir: Option<&Path>,
    ) -> Result<(), TranscodeError> {
        let args = command.build_args();
        debug!("Running encoder: {} {}", self.program.display(), args.join(" "));

        let mut process = Command::new(&self.program);
        process
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            process.current_dir(dir);
        }

        let output = process.output().await.map_err(|e| {
            TranscodeError::without_diagnostics(format!(
                "failed to launch encoder {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let message = match output.status.code() {
                Some(code) => format!("encoder exited with status {}", code),
                None => "encoder terminated by signal".to_string(),
            };
            return Err(TranscodeError::new(message, stderr));
        }

        info!("Encoder finished: {}", command.output_path().display());
        Ok(())
    }
}
