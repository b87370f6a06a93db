//! Error types for topolink.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for topolink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Command channel errors (SSH session, command execution)
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Inventory loading errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Discovery pass errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Archival errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Command channel errors (SSH connection, authentication, command execution).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// SSH connection, handshake, or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Prompt was not seen within the timeout
    #[error("Prompt not found within {0:?}")]
    PromptTimeout(Duration),

    /// Session closed before the command completed
    #[error("Session closed")]
    Closed,

    /// Invalid prompt pattern
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Device descriptor is missing a usable authentication method
    #[error("No authentication method configured for '{host}'")]
    NoAuthMethod { host: String },

    /// Device did not respond after exhausting the retry budget
    #[error("Device '{host}' unreachable after {attempts} attempts: {source}")]
    Unreachable {
        host: String,
        attempts: u32,
        #[source]
        source: Box<ChannelError>,
    },
}

impl ChannelError {
    /// Whether this error is worth another attempt.
    ///
    /// Retry exhaustion and bad patterns are final; everything else
    /// (timeouts, resets, auth hiccups) may clear on a fresh session.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ChannelError::Unreachable { .. } | ChannelError::InvalidPattern(_)
        )
    }
}

/// Inventory loading errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to read the inventory file
    #[error("Failed to read inventory: {0}")]
    Io(#[from] io::Error),

    /// Inventory file is not valid JSON or has the wrong shape
    #[error("Failed to parse inventory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Discovery pass errors.
///
/// Per-device failures are not errors at this level; a pass only fails
/// when there is structurally nothing to discover.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Inventory contains no devices
    #[error("Inventory is empty - nothing to discover")]
    EmptyInventory,

    /// Every device in the inventory exhausted its retries
    #[error("No device in the inventory could be reached ({attempted} attempted)")]
    AllDevicesUnreachable { attempted: usize },
}

/// Archival sink errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Filesystem write failed
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to create the archive directory layout
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using topolink's Error.
pub type Result<T> = std::result::Result<T, Error>;
