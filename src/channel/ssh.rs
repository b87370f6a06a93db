//! SSH command channel implementation using russh.
//!
//! Sessions are opened and closed per command: connect, authenticate,
//! request a PTY and shell, wait for the prompt, run the command, read
//! until the prompt returns, disconnect. Network CLIs have no exec
//! facility, so output collection is prompt-pattern scraping.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use regex::bytes::Regex;
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::buffer::OutputBuffer;
use super::{CommandChannel, CommandOutput, normalize_output};
use crate::error::ChannelError;
use crate::inventory::DeviceDescriptor;

/// Configuration for the SSH command channel.
#[derive(Debug, Clone)]
pub struct SshChannelConfig {
    /// Pattern matching the device prompt at the end of output.
    ///
    /// The default matches the usual CLI prompt terminators (`>`, `#`, `$`).
    pub prompt_pattern: String,

    /// Commands run once per session before the real command, typically
    /// to disable output paging (`terminal length 0` on Cisco-style CLIs).
    pub setup_commands: Vec<String>,

    /// How many bytes of buffer tail to search for the prompt.
    pub search_depth: usize,

    /// Terminal width for the PTY. Wide, so the device does not wrap rows.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,
}

impl Default for SshChannelConfig {
    fn default() -> Self {
        Self {
            prompt_pattern: r"[>#$]\s*$".to_string(),
            setup_commands: vec!["terminal length 0".to_string()],
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

/// SSH-backed [`CommandChannel`].
pub struct SshChannel {
    config: SshChannelConfig,
    prompt: Regex,
}

impl SshChannel {
    /// Create a channel with the default configuration.
    pub fn new() -> Result<Self, ChannelError> {
        Self::with_config(SshChannelConfig::default())
    }

    /// Create a channel with a custom configuration.
    pub fn with_config(config: SshChannelConfig) -> Result<Self, ChannelError> {
        let prompt = Regex::new(&config.prompt_pattern)?;
        Ok(Self { config, prompt })
    }

    /// Connect and authenticate a session to the device.
    async fn connect(&self, device: &DeviceDescriptor) -> Result<Handle<AcceptingHandler>, ChannelError> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(device.timeout()),
            ..Default::default()
        });

        let mut session = tokio::time::timeout(
            device.timeout(),
            client::connect(
                ssh_config,
                (device.host.as_str(), device.port),
                AcceptingHandler,
            ),
        )
        .await
        .map_err(|_| ChannelError::Timeout(device.timeout()))?
        .map_err(ChannelError::Ssh)?;

        self.authenticate(&mut session, device).await?;
        Ok(session)
    }

    /// Authenticate with the device using the descriptor's credentials.
    async fn authenticate(
        &self,
        session: &mut Handle<AcceptingHandler>,
        device: &DeviceDescriptor,
    ) -> Result<(), ChannelError> {
        let success = if let Some(ref password) = device.password {
            session
                .authenticate_password(&device.username, password.expose_secret())
                .await?
                .success()
        } else if let Some(ref path) = device.private_key {
            let key = load_secret_key(
                path,
                device.key_passphrase.as_ref().map(|p| p.expose_secret()),
            )
            .map_err(|e| ChannelError::Key(e.to_string()))?;

            // Pick the best RSA hash algorithm the server supports
            let hash_alg = session.best_supported_rsa_hash().await?.flatten();

            session
                .authenticate_publickey(
                    &device.username,
                    PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                )
                .await?
                .success()
        } else {
            return Err(ChannelError::NoAuthMethod {
                host: device.host.clone(),
            });
        };

        if !success {
            return Err(ChannelError::AuthenticationFailed {
                user: device.username.clone(),
            });
        }

        Ok(())
    }

    /// Open a PTY channel with a shell on the session.
    async fn open_shell(
        &self,
        session: &Handle<AcceptingHandler>,
    ) -> Result<Channel<Msg>, ChannelError> {
        let channel = session.channel_open_session().await?;

        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await?;

        channel.request_shell(true).await?;
        Ok(channel)
    }

    /// Read session output until the prompt appears in the buffer tail.
    async fn read_until_prompt(
        &self,
        channel: &mut Channel<Msg>,
        device: &DeviceDescriptor,
    ) -> Result<String, ChannelError> {
        let mut buffer = OutputBuffer::new(self.config.search_depth);
        let deadline = tokio::time::Instant::now() + device.timeout();

        loop {
            let msg = tokio::time::timeout_at(deadline, channel.wait())
                .await
                .map_err(|_| ChannelError::PromptTimeout(device.timeout()))?;

            match msg {
                Some(ChannelMsg::Data { ref data }) => {
                    buffer.extend(data);
                    if buffer.tail_contains(&self.prompt) {
                        return Ok(buffer.into_string());
                    }
                }
                Some(_) => {}
                None => return Err(ChannelError::Closed),
            }
        }
    }

    /// Send one line to the shell.
    async fn send_line(
        &self,
        channel: &mut Channel<Msg>,
        line: &str,
    ) -> Result<(), ChannelError> {
        let payload = format!("{line}\n");
        channel.data(payload.as_bytes()).await?;
        Ok(())
    }
}

impl CommandChannel for SshChannel {
    async fn execute(
        &mut self,
        device: &DeviceDescriptor,
        command: &str,
    ) -> Result<CommandOutput, ChannelError> {
        let start = Instant::now();

        debug!("connecting to {}:{}", device.host, device.port);
        let session = self.connect(device).await?;
        let mut channel = self.open_shell(&session).await?;

        // Drain the banner and the initial prompt
        self.read_until_prompt(&mut channel, device).await?;

        for setup in &self.config.setup_commands {
            self.send_line(&mut channel, setup).await?;
            self.read_until_prompt(&mut channel, device).await?;
        }

        self.send_line(&mut channel, command).await?;
        let raw_result = self.read_until_prompt(&mut channel, device).await?;

        if let Err(e) = session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
        {
            warn!("disconnect from {} failed: {}", device.host, e);
        }

        let elapsed = start.elapsed();
        let result = normalize_output(&raw_result, command);
        debug!(
            "'{}' on {} completed in {:?} ({} bytes)",
            command,
            device.host,
            elapsed,
            raw_result.len()
        );

        Ok(CommandOutput::new(command, result, raw_result, elapsed))
    }
}


/// SSH client handler accepting any host key.
///
/// Discovery runs against a managed fleet on a management network; host
/// key pinning is left to the surrounding deployment.
struct AcceptingHandler;

impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
