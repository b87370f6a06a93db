//! Command channel layer.
//!
//! A command channel opens an authenticated session to one device, issues
//! one command, and returns the output or a typed failure. The discovery
//! orchestrator only ever talks to devices through this abstraction, so
//! tests can substitute a scripted channel for the SSH implementation.

mod buffer;
mod retry;
mod ssh;

pub use buffer::OutputBuffer;
pub use retry::RetryingChannel;
pub use ssh::{SshChannel, SshChannelConfig};

use std::future::Future;
use std::time::Duration;

use crate::error::ChannelError;
use crate::inventory::DeviceDescriptor;

/// Output of one command execution on one device.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,
}

impl CommandOutput {
    /// Create a new command output from raw session data.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            elapsed,
        }
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    /// Whether the normalized output is empty (device answered with no rows).
    pub fn is_empty(&self) -> bool {
        self.result.trim().is_empty()
    }
}

impl std::fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Trait for device command channels.
///
/// `execute` covers the whole session lifecycle for one command: connect,
/// authenticate, run, collect output, disconnect. A successful return with
/// empty output means the device answered and had nothing to say; channel
/// failures are reported through [`ChannelError`], never as empty output.
pub trait CommandChannel: Send {
    /// Execute a single command on the given device.
    fn execute(
        &mut self,
        device: &DeviceDescriptor,
        command: &str,
    ) -> impl Future<Output = std::result::Result<CommandOutput, ChannelError>> + Send;
}

/// Strip the command echo and the trailing prompt line from raw output.
///
/// Devices echo the issued command back before the output and finish with
/// their prompt; neither belongs to the command result.
pub(crate) fn normalize_output(raw: &str, command: &str) -> String {
    let output = raw.trim_start_matches(['\r', '\n']);
    let output = output
        .strip_prefix(command)
        .unwrap_or(output)
        .trim_start_matches(['\r', '\n']);

    // Strip trailing prompt (last line)
    match output.rfind('\n') {
        Some(pos) => output[..pos].trim_end().to_string(),
        None => String::new(),
    }
}
