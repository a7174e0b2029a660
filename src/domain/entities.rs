//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the webhooker domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::Destination;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Opaque back-reference to the provisioning session that created a binding.
///
/// Holding this handle pins the session's resources for the binding's
/// lifetime; it is never used to move data.
#[derive(Clone)]
pub struct SessionHandle(Arc<dyn Any + Send + Sync>);

impl SessionHandle {
    /// Wrap a transport-level session handle.
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    /// A handle not attached to any live session (tests, detached bindings).
    pub fn detached() -> Self {
        Self(Arc::new(()))
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionHandle")
    }
}

/// Identifier-to-destination binding created by a provisioning session.
///
/// Once inserted into the registry a binding is read-only; only `last_seen`
/// is touched when the dispatcher resolves it, which feeds TTL eviction.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Public identifier callers use to address this binding
    pub id: String,
    /// Destination the dispatcher forwards to
    pub destination: Destination,
    /// Provisioning session that created the binding
    #[allow(dead_code)]
    pub session: SessionHandle,
    /// When the binding was created
    #[allow(dead_code)]
    pub created_at: Instant,
    /// Last time the dispatcher resolved this binding
    pub last_seen: Instant,
}

impl Binding {
    /// Create a new binding.
    pub fn new(id: String, destination: Destination, session: SessionHandle) -> Self {
        let now = Instant::now();
        Self {
            id,
            destination,
            session,
            created_at: now,
            last_seen: now,
        }
    }
}
