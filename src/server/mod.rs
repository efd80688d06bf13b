//! HTTP surface of the remote deployment

use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::TranscodeInteractor;
use crate::error::{ReelcutError, ReelcutResult};
use crate::settings::Settings;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod upload;

use upload::UploadLimits;

/// Room for multipart boundaries and the text fields on top of the file itself
pub const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub interactor: Arc<TranscodeInteractor>,
    pub upload_limits: UploadLimits,
}

impl AppState {
    pub fn new(interactor: Arc<TranscodeInteractor>, spool_dir: Option<std::path::PathBuf>) -> Self {
        let upload_limits = UploadLimits {
            max_size_bytes: interactor.max_upload_bytes(),
            spool_dir,
        };
        Self {
            interactor,
            upload_limits,
        }
    }
}

/// Routes, static artifact serving and request tracing
pub fn create_app(state: AppState, public_dir: &Path) -> Router {
    let body_limit = usize::try_from(
        state
            .upload_limits
            .max_size_bytes
            .saturating_add(FORM_OVERHEAD_BYTES),
    )
    .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/process-video", post(handlers::process_video))
        .route("/health", get(handlers::health))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(settings: &Settings, interactor: Arc<TranscodeInteractor>) -> ReelcutResult<()> {
    tokio::fs::create_dir_all(&settings.server.public_dir).await?;

    let state = AppState::new(interactor, settings.upload.spool_dir.clone());
    let app = create_app(state, &settings.server.public_dir);

    let listener = TcpListener::bind(&settings.server.bind)
        .await
        .map_err(|e| ReelcutError::Server {
            message: format!("failed to bind {}: {}", settings.server.bind, e),
        })?;
    info!(
        "Server ready at http://{} serving {}",
        listener.local_addr()?,
        settings.server.public_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ReelcutError::Server {
            message: e.to_string(),
        })?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, starting graceful shutdown"),
        _ = terminate => info!("SIGTERM received, starting graceful shutdown"),
    }
}
