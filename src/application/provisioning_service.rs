//! Provisioning Service - Registers new webhook bindings
//!
//! Drives the registration half of an interactive provisioning session:
//! parse the destination the operator typed, issue an identifier and an
//! advisory port, store the binding, and build the operator-facing
//! announcement. The SSH adapter owns the byte-level session I/O.

use crate::domain::entities::{Binding, SessionHandle};
use crate::domain::ports::SessionRegistry;
use crate::domain::services::{advisory_port, IdGenerator};
use crate::domain::value_objects::{Destination, DestinationError};
use std::sync::Arc;

const BANNER: &str = r#" _  _  _       _     _                 _
| || || |     | |   | |               | |
| || || | ____| | _ | | _   ___   ___ | |  _
| ||_|| |/ _  ) || \| || \ / _ \ / _ \| | / )
| |___| ( (/ /| |_) ) | | | |_| | |_| | |< (
 \______|\____)____/|_| |_|\___/ \___/|_| \_)
                                             "#;

/// Outcome of a successful registration, echoed back to the operator.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub id: String,
    pub destination: Destination,
    pub webhook_url: String,
    pub advisory_port: u16,
}

/// Provisioning service - registration use case.
pub struct ProvisioningService {
    registry: Arc<dyn SessionRegistry>,
    ids: IdGenerator,
    public_host: String,
    http_port: u16,
    ssh_port: u16,
}

impl ProvisioningService {
    /// Create a new provisioning service.
    ///
    /// `public_host` and the two ports are only used to render the webhook
    /// URL and the reverse-forward command for the operator.
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        public_host: String,
        http_port: u16,
        ssh_port: u16,
    ) -> Self {
        Self {
            registry,
            ids: IdGenerator::new(),
            public_host,
            http_port,
            ssh_port,
        }
    }

    /// Banner and prompt written when an interactive session opens.
    pub fn greeting(&self) -> String {
        format!(
            "{}\n\nWelcome to webhooker!\n\nEnter your webhook destination:\n",
            BANNER
        )
    }

    /// Register the destination the operator typed.
    ///
    /// Parses and validates the line, issues a unique identifier and an
    /// advisory port, and stores the binding. An invalid line fails the
    /// session; nothing is stored.
    pub async fn register(
        &self,
        input: &str,
        session: SessionHandle,
    ) -> Result<Provisioned, DestinationError> {
        let destination = Destination::parse(input)?;
        let id = self.ids.generate();
        let port = advisory_port();

        self.registry
            .put(
                id.clone(),
                Binding::new(id.clone(), destination.clone(), session),
            )
            .await;

        tracing::info!("registered webhook {} -> {}", id, destination);

        Ok(Provisioned {
            webhook_url: format!("http://{}:{}/{}", self.public_host, self.http_port, id),
            id,
            destination,
            advisory_port: port,
        })
    }

    /// Block written back to the operator after a successful registration:
    /// the public webhook URL and a copyable reverse-forward command.
    pub fn announcement(&self, provisioned: &Provisioned) -> String {
        format!(
            "\nGenerate webhook: {}\n\nCommand to copy:\nssh -R 127.0.0.1:{}:{} {} -p {} tunnel\n",
            provisioned.webhook_url,
            provisioned.advisory_port,
            provisioned.destination.host(),
            self.public_host,
            self.ssh_port,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::DashMapSessionRegistry;
    use crate::domain::ports::SessionRegistry;

    fn service() -> (Arc<DashMapSessionRegistry>, ProvisioningService) {
        let registry = Arc::new(DashMapSessionRegistry::new());
        let service = ProvisioningService::new(
            registry.clone(),
            "localhost".to_string(),
            4000,
            2222,
        );
        (registry, service)
    }

    #[tokio::test]
    async fn test_register_stores_binding() {
        let (registry, service) = service();

        let provisioned = service
            .register("http://127.0.0.1:9000/hook", SessionHandle::detached())
            .await
            .unwrap();

        let binding = registry.get(&provisioned.id).await.unwrap();
        assert_eq!(binding.destination.as_str(), "http://127.0.0.1:9000/hook");
    }

    #[tokio::test]
    async fn test_register_invalid_destination_stores_nothing() {
        let (registry, service) = service();

        let result = service
            .register("not a url", SessionHandle::detached())
            .await;

        assert!(result.is_err());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_register_same_destination_twice_yields_distinct_ids() {
        let (registry, service) = service();

        let first = service
            .register("http://127.0.0.1:9000/hook", SessionHandle::detached())
            .await
            .unwrap();
        let second = service
            .register("http://127.0.0.1:9000/hook", SessionHandle::detached())
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(registry.get(&first.id).await.is_some());
        assert!(registry.get(&second.id).await.is_some());
    }

    #[tokio::test]
    async fn test_webhook_url_shape() {
        let (_registry, service) = service();

        let provisioned = service
            .register("http://127.0.0.1:9000/hook", SessionHandle::detached())
            .await
            .unwrap();

        assert_eq!(
            provisioned.webhook_url,
            format!("http://localhost:4000/{}", provisioned.id)
        );
    }

    #[tokio::test]
    async fn test_announcement_contains_url_and_command() {
        let (_registry, service) = service();

        let provisioned = service
            .register("http://127.0.0.1:9000/hook", SessionHandle::detached())
            .await
            .unwrap();
        let announcement = service.announcement(&provisioned);

        assert!(announcement.contains(&provisioned.webhook_url));
        assert!(announcement.contains(&format!(
            "ssh -R 127.0.0.1:{}:127.0.0.1:9000 localhost -p 2222 tunnel",
            provisioned.advisory_port
        )));
    }

    #[tokio::test]
    async fn test_advisory_port_in_range() {
        let (_registry, service) = service();

        let provisioned = service
            .register("http://example.com/hook", SessionHandle::detached())
            .await
            .unwrap();

        assert!((50000..=65535).contains(&provisioned.advisory_port));
    }

    #[test]
    fn test_greeting_has_banner_and_prompt() {
        let (_registry, service) = service();
        let greeting = service.greeting();

        assert!(greeting.contains("Welcome to webhooker!"));
        assert!(greeting.contains("Enter your webhook destination:"));
    }
}
