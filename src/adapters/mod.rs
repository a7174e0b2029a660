//! Adapters Layer
//!
//! Inbound adapters accept SSH provisioning sessions and public HTTP
//! traffic; outbound adapters hold shared state.

pub mod inbound;
pub mod outbound;
