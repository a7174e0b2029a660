//! webhooker Library
//!
//! Exposes the webhook broker components for use in integration tests
//! and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use application::{DispatchError, DispatchService, Provisioned, ProvisioningService};
pub use config::load_config;
pub use domain::entities::{Binding, SessionHandle};
pub use domain::ports::SessionRegistry;
pub use domain::services::IdGenerator;
pub use domain::value_objects::{Destination, DestinationError};
