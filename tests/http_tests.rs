//! Request-level tests for the HTTP surface, driven through `tower::ServiceExt::oneshot`
//! with a fake encoder port.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use reelcut::app::TranscodeInteractor;
use reelcut::domain::errors::TranscodeError;
use reelcut::domain::model::*;
use reelcut::domain::rules::{default_allowed_mime_types, LocalePolicy, UploadGatekeeper};
use reelcut::planner::ArtifactNamer;
use reelcut::ports::{TranscodePort, Variant};
use reelcut::server::{create_app, AppState};

const BOUNDARY: &str = "reelcut-test-boundary";
const MP4_HEADER: &[u8] = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2avc1mp41";

/// Writes a small artifact under the public dir, the way the remote adapter lays it out
struct PublicDirTranscoder {
    public_dir: PathBuf,
    namer: ArtifactNamer,
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl TranscodePort for PublicDirTranscoder {
    async fn invoke(&self, request: TranscodeRequest) -> Result<TranscodeResult, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranscodeError::new(
                "encoder exited with status 1",
                "moov atom not found",
            ));
        }

        let name = self.namer.next_name();
        let dir = self
            .public_dir
            .join(request.locale.as_str())
            .join("optimized-videos");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(&name);
        std::fs::write(&path, b"encoded").unwrap();

        Ok(TranscodeResult {
            output_location: ArtifactLocation::Persisted {
                url: format!("/{}/optimized-videos/{}", request.locale, name),
                path,
            },
            file_name: name,
            output_size_bytes: 7,
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

struct TestServer {
    app: Router,
    transcoder: Arc<PublicDirTranscoder>,
    _public_dir: TempDir,
}

fn server_with(max_size_bytes: u64, fail: bool) -> TestServer {
    let public_dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(PublicDirTranscoder {
        public_dir: public_dir.path().to_path_buf(),
        namer: ArtifactNamer::default(),
        calls: AtomicUsize::new(0),
        fail,
    });

    let interactor = TranscodeInteractor::new(
        transcoder.clone(),
        UploadGatekeeper::new(default_allowed_mime_types(), max_size_bytes),
        LocalePolicy::default(),
        EncodingPreset::remote_default().geometry(),
    );
    let state = AppState::new(Arc::new(interactor), None);

    TestServer {
        app: create_app(state, public_dir.path()),
        transcoder,
        _public_dir: public_dir,
    }
}

fn server() -> TestServer {
    server_with(100 * 1024 * 1024, false)
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        mime: &'a str,
        data: Vec<u8>,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, mime, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, mime
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn mp4_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(MP4_HEADER.len())];
    data[..MP4_HEADER.len()].copy_from_slice(MP4_HEADER);
    data
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-video")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn mp4_file(len: usize) -> Part<'static> {
    Part::File {
        name: "clip.mp4",
        mime: "video/mp4",
        data: mp4_bytes(len),
    }
}

#[tokio::test]
async fn test_successful_upload_returns_contract_keys() {
    let server = server();
    let (status, json) = send(
        &server.app,
        upload_request(&[
            mp4_file(4096),
            Part::Text("trimStart", "2"),
            Part::Text("trimEnd", "5"),
            Part::Text("lang", "en"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Video processed successfully");
    assert_eq!(json["duration"], 3.0);
    assert_eq!(json["originalFileType"], "video/mp4");
    assert_eq!(json["convertedFileType"], "video/mp4");
    assert_eq!(json["size"], 7);

    let name = json["covertedFileName"].as_str().unwrap();
    assert!(name.ends_with("-optimized.mp4"));
    assert_eq!(
        json["videoURL"].as_str().unwrap(),
        format!("/en/optimized-videos/{}", name)
    );
}

#[tokio::test]
async fn test_artifact_is_served_statically() {
    let server = server();
    let (_, json) = send(
        &server.app,
        upload_request(&[mp4_file(1024), Part::Text("trimEnd", "1")]),
    )
    .await;
    let url = json["videoURL"].as_str().unwrap().to_string();
    assert!(url.starts_with("/tc/optimized-videos/"));

    let response = server
        .app
        .clone()
        .oneshot(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"encoded");
}

#[tokio::test]
async fn test_consecutive_uploads_get_distinct_names() {
    let server = server();
    let first = send(
        &server.app,
        upload_request(&[mp4_file(1024), Part::Text("trimEnd", "1")]),
    )
    .await;
    let second = send(
        &server.app,
        upload_request(&[mp4_file(1024), Part::Text("trimEnd", "1")]),
    )
    .await;

    assert_ne!(first.1["covertedFileName"], second.1["covertedFileName"]);
    assert_eq!(server.transcoder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_file() {
    let server = server();
    let (status, json) = send(
        &server.app,
        upload_request(&[Part::Text("trimStart", "0"), Part::Text("trimEnd", "1")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No video file provided");
    assert_eq!(server.transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_text_part_named_file_is_missing_file() {
    let server = server();
    let (status, json) = send(
        &server.app,
        upload_request(&[Part::Text("file", "clip.mp4"), Part::Text("trimEnd", "1")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No video file provided");
    assert_eq!(server.transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_multipart_body_is_missing_file() {
    let server = server();
    let request = Request::builder()
        .method("POST")
        .uri("/api/process-video")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file":"clip.mp4"}"#))
        .unwrap();

    let (status, json) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No video file provided");
}

#[tokio::test]
async fn test_unsupported_type() {
    let server = server();
    let (status, json) = send(
        &server.app,
        upload_request(&[
            Part::File {
                name: "notes.txt",
                mime: "text/plain",
                data: b"hello".to_vec(),
            },
            Part::Text("trimStart", "5"),
            Part::Text("trimEnd", "2"),
        ]),
    )
    .await;

    // Type is checked before the trim range
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unsupported file type");
}

#[tokio::test]
async fn test_too_large() {
    let server = server_with(1024, false);
    let (status, json) = send(
        &server.app,
        upload_request(&[mp4_file(4096), Part::Text("trimEnd", "1")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "File is too large");
    assert_eq!(server.transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_trim_range() {
    let server = server();
    for (start, end) in [("5", "2"), ("3", "3"), ("-1", "2"), ("abc", "2")] {
        let (status, json) = send(
            &server.app,
            upload_request(&[
                mp4_file(1024),
                Part::Text("trimStart", start),
                Part::Text("trimEnd", end),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "range {}..{}", start, end);
        assert_eq!(json["error"], "Invalid trim range");
    }
    assert_eq!(server.transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_trim_end_beyond_media_duration() {
    let server = server();
    let (status, json) = send(
        &server.app,
        upload_request(&[
            mp4_file(1024),
            Part::Text("trimEnd", "12"),
            Part::Text("mediaDuration", "10"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid trim range");
}

#[tokio::test]
async fn test_encoder_failure_is_opaque() {
    let server = server_with(100 * 1024 * 1024, true);
    let (status, json) = send(
        &server.app,
        upload_request(&[mp4_file(1024), Part::Text("trimEnd", "1")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to process video");
    assert!(!json.to_string().contains("moov"));
}

#[tokio::test]
async fn test_health() {
    let server = server();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(&server.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
