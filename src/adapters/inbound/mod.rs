mod http_server;
mod ssh_server;

pub use http_server::{router, HttpServer};
pub use ssh_server::SshServer;
