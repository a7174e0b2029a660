//! Dispatch Service - Forwards inbound webhook calls
//!
//! Resolves the identifier from a public HTTP call to its binding and
//! replays the call against the stored destination. The forward is a
//! direct outbound request from the broker process; it does not ride any
//! reverse-forwarded connection the operator may have opened.

use crate::domain::ports::SessionRegistry;
use bytes::Bytes;
use reqwest::StatusCode;
use std::sync::Arc;

/// Errors a single dispatch can fail with. Each is local to its request;
/// the registry entry stays valid for future calls.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("client id not found")]
    UnknownClient,
    #[error("failed to create request")]
    BuildRequest,
    #[error("failed to forward request: {0}")]
    Forward(#[source] reqwest::Error),
}

/// Status and body relayed verbatim to the inbound caller.
/// Headers are deliberately not propagated.
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Dispatch service - webhook forwarding use case.
pub struct DispatchService {
    registry: Arc<dyn SessionRegistry>,
    client: reqwest::Client,
}

impl DispatchService {
    /// Create a new dispatch service with a shared outbound client.
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self {
            registry,
            client: reqwest::Client::new(),
        }
    }

    /// Forward one inbound call addressed to `id`.
    ///
    /// The inbound method and body are preserved byte-for-byte; the
    /// destination URL is used exactly as captured at registration. An
    /// unknown id fails before any outbound traffic. Dropping the returned
    /// future (caller disconnect) cancels the in-flight outbound request.
    pub async fn forward(
        &self,
        id: &str,
        method: &str,
        body: Bytes,
    ) -> Result<ForwardedResponse, DispatchError> {
        let binding = self
            .registry
            .get(id)
            .await
            .ok_or(DispatchError::UnknownClient)?;
        self.registry.touch(id).await;

        let method =
            reqwest::Method::from_bytes(method.as_bytes()).map_err(|_| DispatchError::BuildRequest)?;
        let request = self
            .client
            .request(method, binding.destination.as_str())
            .body(body)
            .build()
            .map_err(|_| DispatchError::BuildRequest)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(DispatchError::Forward)?;

        let status = response.status();
        let body = response.bytes().await.map_err(DispatchError::Forward)?;

        Ok(ForwardedResponse { status, body })
    }
}
