//! Session Registry Port
//!
//! Defines the interface for storing identifier-to-destination bindings.

use crate::domain::entities::Binding;
use async_trait::async_trait;
use std::time::Duration;

/// Registry of live bindings, keyed by public identifier.
///
/// Writers are provisioning sessions; readers are dispatcher requests.
/// A binding must be visible to readers as soon as `put` returns, and
/// unrelated identifiers must not contend on a single exclusive lock.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Insert a binding unconditionally (last-write-wins on id collision,
    /// which the identifier generator rules out in practice).
    async fn put(&self, id: String, binding: Binding);

    /// Look up a binding by identifier.
    async fn get(&self, id: &str) -> Option<Binding>;

    /// Remove a binding.
    #[allow(dead_code)]
    async fn remove(&self, id: &str);

    /// Update the last_seen timestamp for a binding.
    /// Called when the dispatcher resolves it.
    async fn touch(&self, id: &str);

    /// Remove all bindings not resolved within the TTL.
    #[allow(dead_code)]
    async fn cleanup_expired(&self, ttl: Duration) -> usize;

    /// Total number of live bindings.
    #[allow(dead_code)]
    async fn count(&self) -> usize;
}
