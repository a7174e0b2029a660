//! Provisioning Endpoint
//!
//! SSH server operators connect to for registering webhook destinations.
//! Each session is a small state machine: a raw `tunnel` command parks the
//! session to keep it alive for a previously-arranged reverse forward,
//! anything else gets the interactive prompt, one line of input, and the
//! announcement block.
//!
//! Reverse-forward binds are granted and logged but never carry webhook
//! traffic; the dispatcher calls destinations directly.

use crate::application::ProvisioningService;
use crate::domain::entities::SessionHandle;
use anyhow::Context;
use russh::keys::{load_secret_key, PublicKey};
use russh::server::{Auth, Config as SshConfig, Msg, Server, Session};
use russh::{Channel, ChannelId, CryptoVec, Pty};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// SSH server for interactive provisioning sessions.
pub struct SshServer {
    provisioning: Arc<ProvisioningService>,
    listen_addr: String,
    host_key_path: String,
}

impl SshServer {
    pub fn new(
        provisioning: Arc<ProvisioningService>,
        listen_addr: String,
        host_key_path: String,
    ) -> Self {
        Self {
            provisioning,
            listen_addr,
            host_key_path,
        }
    }

    /// Run the provisioning endpoint.
    ///
    /// A missing or unparsable host key is fatal before the listener binds.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let host_key = load_secret_key(&self.host_key_path, None)
            .with_context(|| format!("failed to load host key from {}", self.host_key_path))?;

        let config = Arc::new(SshConfig {
            inactivity_timeout: Some(Duration::from_secs(3600)),
            auth_rejection_time: Duration::from_secs(3),
            auth_rejection_time_initial: Some(Duration::ZERO),
            keys: vec![host_key],
            ..Default::default()
        });

        tracing::info!("provisioning endpoint listening on {}", self.listen_addr);

        let addr = self.listen_addr.clone();
        self.run_on_address(config, addr).await?;
        Ok(())
    }
}

impl Server for SshServer {
    type Handler = SessionHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> SessionHandler {
        SessionHandler::new(self.provisioning.clone(), peer)
    }
}

/// Per-session provisioning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Session opened, operation not yet known.
    Start,
    /// Banner written, waiting for one line of input.
    Prompt,
    /// Raw `tunnel` command; parked until the peer disconnects.
    IdleTunnel,
    /// Registration finished (or failed); further input is ignored.
    Done,
}

/// Handler for one SSH connection.
pub struct SessionHandler {
    provisioning: Arc<ProvisioningService>,
    peer: Option<SocketAddr>,
    state: SessionState,
    channel: Option<ChannelId>,
    line: LineBuffer,
}

impl SessionHandler {
    fn new(provisioning: Arc<ProvisioningService>, peer: Option<SocketAddr>) -> Self {
        Self {
            provisioning,
            peer,
            state: SessionState::Start,
            channel: None,
            line: LineBuffer::new(),
        }
    }

    /// Write the banner and prompt, then wait for input via `data` events.
    fn enter_prompt(&mut self, channel: ChannelId, session: &mut Session) -> anyhow::Result<()> {
        self.state = SessionState::Prompt;
        self.channel = Some(channel);

        let greeting = format!("{}$", crlf(&self.provisioning.greeting()));
        session.data(channel, CryptoVec::from(greeting))?;
        Ok(())
    }

    /// Close the channel; the binding (if any) stays in the registry.
    fn finish(&mut self, channel: ChannelId, session: &mut Session) -> anyhow::Result<()> {
        self.state = SessionState::Done;
        session.eof(channel)?;
        session.close(channel)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl russh::server::Handler for SessionHandler {
    type Error = anyhow::Error;

    // Provisioning sessions are unauthenticated: any key, or none, is
    // accepted.
    async fn auth_none(&mut self, _user: &str) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn auth_publickey(
        &mut self,
        _user: &str,
        _key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        _channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        _term: &str,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel)?;
        self.enter_prompt(channel, session)
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel)?;

        if data == b"tunnel" {
            // Keep-alive for a session whose reverse forward was already
            // negotiated; no further interaction until disconnect.
            self.state = SessionState::IdleTunnel;
            session.data(
                channel,
                CryptoVec::from("Tunneling traffic to your endpoint".to_string()),
            )?;
            return Ok(());
        }

        self.enter_prompt(channel, session)
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.state != SessionState::Prompt || self.channel != Some(channel) {
            return Ok(());
        }

        // Echo so the operator sees their own typing.
        session.data(channel, CryptoVec::from(data.to_vec()))?;

        let Some(input) = self.line.push(data) else {
            return Ok(());
        };

        let handle = SessionHandle::new(session.handle());
        match self.provisioning.register(&input, handle).await {
            Ok(provisioned) => {
                let announcement = crlf(&self.provisioning.announcement(&provisioned));
                session.data(channel, CryptoVec::from(announcement))?;
            }
            Err(err) => {
                tracing::warn!("invalid destination from {:?}: {}", self.peer, err);
            }
        }

        self.finish(channel, session)
    }

    async fn tcpip_forward(
        &mut self,
        address: &str,
        port: &mut u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        tracing::info!("granting reverse forward bind on {}:{}", address, port);
        Ok(true)
    }

    async fn cancel_tcpip_forward(
        &mut self,
        address: &str,
        port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        tracing::info!("cancelled reverse forward on {}:{}", address, port);
        Ok(true)
    }
}

/// Terminal output wants CRLF line endings.
fn crlf(text: &str) -> String {
    text.replace('\n', "\r\n")
}

/// Accumulates raw session bytes into one line of operator input.
///
/// Line editing proper is out of scope; only backspace and the line
/// terminator are interpreted, other control bytes are dropped.
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed bytes; returns the completed line once a terminator arrives.
    fn push(&mut self, data: &[u8]) -> Option<String> {
        for &byte in data {
            match byte {
                b'\r' | b'\n' => {
                    let line = String::from_utf8_lossy(&self.buf).into_owned();
                    self.buf.clear();
                    return Some(line);
                }
                0x08 | 0x7f => {
                    self.buf.pop();
                }
                b if b.is_ascii_control() => {}
                b => self.buf.push(b),
            }
        }
        None
    }
}
