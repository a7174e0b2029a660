//! Public Webhook Endpoint
//!
//! Accepts `POST /{id}` and hands the call to the dispatch service. Errors
//! map to fixed bodies: unknown id is the caller's mistake (400), anything
//! that goes wrong past the lookup is ours (500).

use crate::application::{DispatchError, DispatchService};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// HTTP server for inbound webhook calls.
pub struct HttpServer {
    listen_addr: String,
    dispatch: Arc<DispatchService>,
}

impl HttpServer {
    pub fn new(dispatch: Arc<DispatchService>, listen_addr: String) -> Self {
        Self {
            listen_addr,
            dispatch,
        }
    }

    /// Run the webhook endpoint.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.dispatch.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("webhook endpoint listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Build the webhook router. Exposed so tests can drive it directly.
pub fn router(dispatch: Arc<DispatchService>) -> Router {
    Router::new()
        .route("/:id", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatch)
}

async fn webhook_handler(
    State(dispatch): State<Arc<DispatchService>>,
    Path(id): Path<String>,
    method: Method,
    body: Bytes,
) -> Response {
    // This handler future is dropped when the caller disconnects, which
    // cancels the in-flight outbound forward.
    match dispatch.forward(&id, method.as_str(), body).await {
        Ok(forwarded) => (forwarded.status, forwarded.body).into_response(),
        Err(err @ DispatchError::UnknownClient) => {
            tracing::debug!("dispatch for unknown id {}", id);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err @ DispatchError::BuildRequest) => {
            tracing::warn!("failed to build outbound request for {}", id);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(DispatchError::Forward(err)) => {
            tracing::warn!("forward for {} failed: {}", id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to forward request".to_string(),
            )
                .into_response()
        }
    }
}
