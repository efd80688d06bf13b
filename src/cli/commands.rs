//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::app::container::build_probe_port;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{ProbeArgs, TranscodeArgs};
use crate::domain::model::*;
use crate::ports::Variant;
use crate::server;
use crate::settings::Settings;
use crate::utils::{format_file_size, guess_mime_type};

/// Summary printed after a command-line transcode
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeReport {
    pub variant: String,
    pub file_name: String,
    pub locator: String,
    pub size: u64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProbeReport<'a> {
    path: &'a Path,
    duration: f64,
}

/// Execute the serve command. Its arguments are applied as config overrides.
pub async fn serve(settings: Settings) -> Result<()> {
    let container = DefaultAppContainer::new(settings)?;
    let interactor = container.transcode_interactor(Variant::Remote)?;

    server::serve(container.settings(), interactor).await?;
    Ok(())
}

/// Execute the transcode command
pub async fn transcode(args: TranscodeArgs, mut settings: Settings) -> Result<()> {
    if let Some(crf) = args.crf {
        match args.variant {
            Variant::Remote => settings.presets.remote.crf = crf,
            Variant::Local => settings.presets.local.crf = crf,
        }
    }

    let metadata = tokio::fs::metadata(&args.input)
        .await
        .with_context(|| format!("Input file does not exist: {}", args.input.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Input is not a file: {}", args.input.display());
    }

    if let Some(output) = &args.output {
        if args.variant == Variant::Remote {
            anyhow::bail!("--output only applies to the local variant");
        }
        if output.exists() {
            anyhow::bail!("Output file already exists: {}", output.display());
        }
    }

    let container = DefaultAppContainer::new(settings)?;
    let interactor = container.transcode_interactor(args.variant)?;

    let declared_mime_type = args
        .mime
        .clone()
        .unwrap_or_else(|| guess_mime_type(&args.input).to_string());
    let submission = TranscodeSubmission {
        media: Some(UploadedMedia {
            file_name: args
                .input
                .file_name()
                .map(|name| name.to_string_lossy().to_string()),
            declared_mime_type,
            size_bytes: metadata.len(),
            content: MediaPayload::OnDisk(args.input.clone()),
        }),
        trim_start: Some(args.start.clone()),
        trim_end: Some(args.end.clone()),
        lang: args.lang.clone(),
        media_duration: args.media_duration.clone(),
    };

    info!(
        "Transcoding {} ({}) with the {} variant",
        args.input.display(),
        format_file_size(metadata.len()),
        args.variant
    );
    let result = interactor.execute(submission).await?;

    let written_to = match (&result.output_location, &args.output) {
        (ArtifactLocation::InMemory { data, .. }, Some(output)) => {
            write_new_file(output, data).await?;
            Some(output.clone())
        }
        (ArtifactLocation::Persisted { path, .. }, _) => Some(path.clone()),
        _ => None,
    };

    let report = TranscodeReport {
        variant: args.variant.to_string(),
        locator: result.output_location.locator().to_string(),
        file_name: result.file_name,
        size: result.output_size_bytes,
        duration: result.duration_seconds,
        processing_time: result.processing_time_seconds,
        written_to,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, settings: Settings) -> Result<()> {
    let probe = build_probe_port(&settings)?;
    let duration = probe
        .probe_duration(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        let report = ProbeReport {
            path: &args.input,
            duration,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: {:.3}s ({})",
            args.input.display(),
            duration,
            TimeSpec::from_seconds(duration)
        );
    }

    Ok(())
}

/// Write `data` to a file that must not exist yet
async fn write_new_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(data).await?;
    file.flush().await?;
    Ok(())
}
