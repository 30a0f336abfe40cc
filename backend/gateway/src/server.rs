//! Main HTTP Gateway Server.
//!
//! Routes the inbound MMS webhook, the health check, and published media.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::{OriginalUri, State},
    http::HeaderMap,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use keeper_channels::FormParams;
use keeper_media::media_router;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::auth;
use crate::health_api;
use crate::outcome::{Outcome, method_not_allowed};
use crate::webhook::{InboundRequest, MmsWebhook};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub webhook: Arc<MmsWebhook>,
    pub started_at: DateTime<Utc>,
}

/// Build the gateway router. Published media is served under `/media` when
/// `media_public_dir` is set.
pub fn build_router(
    webhook_path: &str,
    webhook: Arc<MmsWebhook>,
    media_public_dir: Option<PathBuf>,
) -> Router {
    let state = GatewayState {
        webhook,
        started_at: Utc::now(),
    };

    let mut app = Router::new()
        .route(webhook_path, post(handle_webhook).fallback(method_not_allowed))
        .route("/api/health", get(health_api::get_health))
        .with_state(state);

    if let Some(dir) = media_public_dir {
        app = app.nest("/media", media_router(dir));
    }

    app.layer(TraceLayer::new_for_http())
}

async fn handle_webhook(
    State(state): State<GatewayState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Outcome {
    let request_id = Uuid::new_v4();
    let span = info_span!("mms_webhook", request_id = %request_id);

    async move {
        let request = InboundRequest {
            callback_url: auth::callback_url(&headers, &uri),
            signature: auth::signature(&headers).map(str::to_string),
            params: FormParams::parse(&body),
        };
        let outcome = state.webhook.handle(request).await;
        info!(outcome = outcome.label(), "Webhook handled");
        outcome
    }
    .instrument(span)
    .await
}

/// Starts the main Axum HTTP server and runs until Ctrl+C or SIGTERM.
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
