// Unit tests for the transcode interactor

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::*;

const MP4_HEADER: &[u8] = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2avc1mp41";

/// Records invocations and answers with a canned artifact
#[derive(Default)]
struct RecordingTranscoder {
    calls: AtomicUsize,
    last_locale: Mutex<Option<String>>,
    fail_with: Option<TranscodeError>,
}

#[async_trait]
impl TranscodePort for RecordingTranscoder {
    async fn invoke(&self, request: TranscodeRequest) -> Result<TranscodeResult, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_locale.lock().unwrap() = Some(request.locale.to_string());
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        let name = "1700000000000-optimized.mp4".to_string();
        Ok(TranscodeResult {
            output_location: ArtifactLocation::Persisted {
                path: format!("public/{}/optimized-videos/{}", request.locale, name).into(),
                url: format!("/{}/optimized-videos/{}", request.locale, name),
            },
            file_name: name,
            output_size_bytes: 2048,
            duration_seconds: request.trim.duration_seconds(),
            original_mime_type: request.media.declared_mime_type,
            output_mime_type: OUTPUT_MIME_TYPE.to_string(),
            processing_time_seconds: None,
        })
    }

    fn variant(&self) -> Variant {
        Variant::Remote
    }
}

struct FixedProbe(f64);

#[async_trait]
impl ProbePort for FixedProbe {
    async fn probe_duration(&self, _path: &Path) -> Result<f64, DomainError> {
        Ok(self.0)
    }
}

fn interactor(transcoder: Arc<RecordingTranscoder>) -> TranscodeInteractor {
    TranscodeInteractor::new(
        transcoder,
        UploadGatekeeper::default(),
        LocalePolicy::default(),
        EncodingPreset::remote_default().geometry(),
    )
}

fn mp4_payload(len: usize) -> Bytes {
    let mut data = vec![0u8; len.max(MP4_HEADER.len())];
    data[..MP4_HEADER.len()].copy_from_slice(MP4_HEADER);
    Bytes::from(data)
}

fn submission(mime: &str, data: Bytes, start: &str, end: &str) -> TranscodeSubmission {
    TranscodeSubmission {
        media: Some(UploadedMedia::buffered(
            Some("clip.mp4".to_string()),
            mime,
            data,
        )),
        trim_start: Some(start.to_string()),
        trim_end: Some(end.to_string()),
        lang: Some("en".to_string()),
        media_duration: None,
    }
}

#[tokio::test]
async fn test_missing_file_never_invokes_encoder() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let err = interactor(transcoder.clone())
        .execute(TranscodeSubmission::default())
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::MissingFile);
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_type_checked_before_trim() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let err = interactor(transcoder.clone())
        .execute(submission("application/pdf", mp4_payload(64), "5", "1"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UnsupportedType(_)));
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let interactor = TranscodeInteractor::new(
        transcoder.clone(),
        UploadGatekeeper::new(vec!["video/mp4".to_string()], 1024),
        LocalePolicy::default(),
        OutputGeometry::new(480, 854),
    );

    let err = interactor
        .execute(submission("video/mp4", mp4_payload(1025), "0", "1"))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::TooLarge { size: 1025, limit: 1024 });
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disguised_content_rejected_when_sniffing() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let png = Bytes::from_static(b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR");

    let err = interactor(transcoder.clone())
        .execute(submission("video/mp4", png.clone(), "0", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnsupportedType(_)));

    let result = interactor(transcoder.clone())
        .with_content_sniffing(false)
        .execute(submission("video/mp4", png, "0", "1"))
        .await;
    assert!(result.is_ok());
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_or_inverted_range_rejected() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let interactor = interactor(transcoder.clone());

    for (start, end) in [("0", "0"), ("5", "2"), ("", ""), ("abc", "4")] {
        let err = interactor
            .execute(submission("video/mp4", mp4_payload(64), start, end))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)), "{:?}..{:?}", start, end);
    }
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ten_mebibyte_mp4_first_second() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let result = interactor(transcoder.clone())
        .execute(submission("video/mp4", mp4_payload(10 * 1024 * 1024), "0", "1"))
        .await
        .unwrap();

    assert_eq!(result.duration_seconds, 1.0);
    assert_eq!(result.output_mime_type, "video/mp4");
    assert_eq!(result.original_mime_type, "video/mp4");
    assert!(result.file_name.ends_with("-optimized.mp4"));
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duration_echoes_requested_window() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let result = interactor(transcoder)
        .execute(submission("video/mp4", mp4_payload(64), "2", "5"))
        .await
        .unwrap();

    assert_eq!(result.duration_seconds, 3.0);
}

#[tokio::test]
async fn test_unknown_lang_falls_back_to_default_locale() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let mut sub = submission("video/mp4", mp4_payload(64), "0", "1");
    sub.lang = Some("../../tmp".to_string());

    let result = interactor(transcoder.clone()).execute(sub).await.unwrap();

    assert_eq!(transcoder.last_locale.lock().unwrap().as_deref(), Some("tc"));
    assert!(result.output_location.locator().starts_with("/tc/"));
}

#[tokio::test]
async fn test_supplied_duration_bounds_trim_end() {
    let transcoder = Arc::new(RecordingTranscoder::default());
    let mut sub = submission("video/mp4", mp4_payload(64), "0", "12");
    sub.media_duration = Some("10".to_string());

    let err = interactor(transcoder.clone()).execute(sub).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidRange(_)));
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_probed_duration_bounds_trim_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, mp4_payload(64)).unwrap();

    let transcoder = Arc::new(RecordingTranscoder::default());
    let probe: Arc<dyn ProbePort> = Arc::new(FixedProbe(5.0));
    let interactor = interactor(transcoder.clone()).with_probe(Some(probe));

    let on_disk = |end: &str| TranscodeSubmission {
        media: Some(UploadedMedia {
            file_name: Some("clip.mp4".to_string()),
            declared_mime_type: "video/mp4".to_string(),
            size_bytes: 64,
            content: MediaPayload::OnDisk(path.clone()),
        }),
        trim_start: Some("1".to_string()),
        trim_end: Some(end.to_string()),
        ..Default::default()
    };

    assert!(matches!(
        interactor.execute(on_disk("8")).await,
        Err(DomainError::InvalidRange(_))
    ));
    assert!(interactor.execute(on_disk("4")).await.is_ok());
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_encoder_failure_keeps_diagnostics() {
    let transcoder = Arc::new(RecordingTranscoder {
        fail_with: Some(TranscodeError::new(
            "encoder exited with status 1",
            "moov atom not found",
        )),
        ..Default::default()
    });

    let err = interactor(transcoder)
        .execute(submission("video/mp4", mp4_payload(64), "0", "1"))
        .await
        .unwrap_err();

    match err {
        DomainError::EncoderFailure(inner) => {
            assert_eq!(inner.diagnostic_output, "moov atom not found")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
