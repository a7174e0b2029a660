mod dispatch_service;
mod provisioning_service;

pub use dispatch_service::{DispatchError, DispatchService, ForwardedResponse};
pub use provisioning_service::{Provisioned, ProvisioningService};
