//! Multipart form intake
//!
//! The `file` field is streamed into a temporary spool file. Reading stops as
//! soon as the size ceiling is crossed, so an oversized upload is never held in
//! full; the gatekeeper then rejects it by its recorded size.

use std::path::PathBuf;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaPayload, TranscodeSubmission, UploadedMedia};

/// Form field names
pub const FIELD_FILE: &str = "file";
pub const FIELD_TRIM_START: &str = "trimStart";
pub const FIELD_TRIM_END: &str = "trimEnd";
pub const FIELD_LANG: &str = "lang";
pub const FIELD_MEDIA_DURATION: &str = "mediaDuration";

#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_size_bytes: u64,
    pub spool_dir: Option<PathBuf>,
}

fn internal(context: &str) -> impl Fn(std::io::Error) -> DomainError + '_ {
    move |e| DomainError::Internal(format!("{}: {}", context, e))
}

fn multipart_error(err: MultipartError, limits: &UploadLimits) -> DomainError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        // The body limit tripped before the file size could be recorded
        return DomainError::TooLarge {
            size: limits.max_size_bytes.saturating_add(1),
            limit: limits.max_size_bytes,
        };
    }
    DomainError::Internal(format!("malformed multipart body: {}", err))
}

/// Collect the form into a submission. Unknown fields are ignored.
pub async fn read_submission(
    mut multipart: Multipart,
    limits: &UploadLimits,
) -> Result<TranscodeSubmission, DomainError> {
    let mut submission = TranscodeSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            // A plain text part under the file name carries no upload
            FIELD_FILE if field.file_name().is_none() => {
                debug!("Ignoring text part named {:?}", FIELD_FILE)
            }
            FIELD_FILE => {
                let media = spool_field(field, limits).await?;
                let truncated = media.size_bytes > limits.max_size_bytes;
                submission.media = Some(media);
                if truncated {
                    break;
                }
            }
            FIELD_TRIM_START => submission.trim_start = Some(read_text(field, limits).await?),
            FIELD_TRIM_END => submission.trim_end = Some(read_text(field, limits).await?),
            FIELD_LANG => submission.lang = Some(read_text(field, limits).await?),
            FIELD_MEDIA_DURATION => {
                submission.media_duration = Some(read_text(field, limits).await?)
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(submission)
}

async fn read_text(field: Field<'_>, limits: &UploadLimits) -> Result<String, DomainError> {
    field.text().await.map_err(|e| multipart_error(e, limits))
}

async fn spool_field(mut field: Field<'_>, limits: &UploadLimits) -> Result<UploadedMedia, DomainError> {
    let file_name = field.file_name().map(str::to_string);
    let declared_mime_type = field.content_type().unwrap_or_default().to_string();

    let spool = match &limits.spool_dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(internal("failed to create spool file"))?;
    let mut writer = tokio::fs::File::from_std(
        spool.reopen().map_err(internal("failed to open spool file"))?,
    );

    let mut size_bytes: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limits))?
    {
        size_bytes += chunk.len() as u64;
        if size_bytes > limits.max_size_bytes {
            break;
        }
        writer
            .write_all(&chunk)
            .await
            .map_err(internal("failed to spool upload"))?;
    }
    writer
        .flush()
        .await
        .map_err(internal("failed to spool upload"))?;

    debug!(
        "Spooled {} bytes of {:?} to {}",
        size_bytes,
        file_name,
        spool.path().display()
    );

    Ok(UploadedMedia {
        file_name,
        declared_mime_type,
        size_bytes,
        content: MediaPayload::Spooled(spool),
    })
}
