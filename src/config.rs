use serde::Deserialize;

const DEFAULT_SSH_PORT: u16 = 2222;
const DEFAULT_HTTP_PORT: u16 = 4000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Listener settings
    pub ssh_listen_addr: String,
    pub http_listen_addr: String,

    // Host advertised in webhook URLs and reverse-forward commands
    pub public_host: String,

    // SSH host key, required at startup
    pub host_key_path: String,

    // Binding lifetime settings
    pub binding_ttl_secs: u64,
    pub binding_gc_interval_secs: u64,

    pub debug: bool,
}

impl Config {
    /// Port the provisioning endpoint listens on, as advertised to operators.
    pub fn ssh_port(&self) -> u16 {
        port_of(&self.ssh_listen_addr).unwrap_or(DEFAULT_SSH_PORT)
    }

    /// Port the public webhook endpoint listens on.
    pub fn http_port(&self) -> u16 {
        port_of(&self.http_listen_addr).unwrap_or(DEFAULT_HTTP_PORT)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssh_listen_addr: format!("0.0.0.0:{}", DEFAULT_SSH_PORT),
            http_listen_addr: format!("0.0.0.0:{}", DEFAULT_HTTP_PORT),
            public_host: "localhost".to_string(),
            host_key_path: "keys/privateKey".to_string(),
            binding_ttl_secs: 3600,
            binding_gc_interval_secs: 60,
            debug: false,
        }
    }
}

fn port_of(addr: &str) -> Option<u16> {
    addr.rsplit(':').next()?.parse().ok()
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    Ok(Config {
        ssh_listen_addr: std::env::var("WEBHOOKER_SSH_ADDR").unwrap_or(defaults.ssh_listen_addr),
        http_listen_addr: std::env::var("WEBHOOKER_HTTP_ADDR")
            .unwrap_or(defaults.http_listen_addr),
        public_host: std::env::var("WEBHOOKER_PUBLIC_HOST").unwrap_or(defaults.public_host),
        host_key_path: std::env::var("WEBHOOKER_HOST_KEY").unwrap_or(defaults.host_key_path),
        binding_ttl_secs: std::env::var("WEBHOOKER_BINDING_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.binding_ttl_secs),
        binding_gc_interval_secs: std::env::var("WEBHOOKER_BINDING_GC_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.binding_gc_interval_secs),
        debug: std::env::var("DEBUG").is_ok(),
    })
}
