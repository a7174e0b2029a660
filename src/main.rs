//! webhooker - Webhook broker with an SSH provisioning endpoint
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use webhooker::adapters::inbound::{HttpServer, SshServer};
use webhooker::adapters::outbound::DashMapSessionRegistry;
use webhooker::application::{DispatchService, ProvisioningService};
use webhooker::config::load_config;
use webhooker::domain::ports::SessionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting webhooker ssh={} http={}",
        cfg.ssh_listen_addr,
        cfg.http_listen_addr
    );

    // ===== COMPOSITION ROOT =====

    // Session registry (DashMap) with TTL eviction
    let registry = Arc::new(DashMapSessionRegistry::new());
    registry.start_gc(
        Duration::from_secs(cfg.binding_ttl_secs),
        Duration::from_secs(cfg.binding_gc_interval_secs),
    );
    let registry: Arc<dyn SessionRegistry> = registry;

    // Application services
    let provisioning = Arc::new(ProvisioningService::new(
        registry.clone(),
        cfg.public_host.clone(),
        cfg.http_port(),
        cfg.ssh_port(),
    ));
    let dispatch = Arc::new(DispatchService::new(registry));

    // Inbound adapters: both listeners accept independently
    let mut ssh_server = SshServer::new(
        provisioning,
        cfg.ssh_listen_addr.clone(),
        cfg.host_key_path.clone(),
    );
    let http_server = HttpServer::new(dispatch, cfg.http_listen_addr.clone());

    tokio::try_join!(ssh_server.run(), http_server.run())?;
    Ok(())
}
