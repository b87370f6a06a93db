//! Device inventory loading.
//!
//! The inventory is a persisted JSON list of device descriptors:
//!
//! ```json
//! {
//!   "devices": [
//!     { "host": "10.0.0.1", "username": "admin", "password": "secret" },
//!     { "host": "10.0.0.2", "username": "admin", "private_key": "/home/net/.ssh/id_ed25519" }
//!   ]
//! }
//! ```
//!
//! It is consumed read-only at the start of a discovery pass.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{InventoryError, Result};

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection parameters for one managed device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDescriptor {
    /// Management address or hostname to connect to.
    pub host: String,

    /// SSH port (default: 22).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication, if any. Never logged or serialized.
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Path to a private key file, used when no password is set.
    #[serde(default)]
    pub private_key: Option<PathBuf>,

    /// Optional passphrase for an encrypted private key.
    #[serde(default)]
    pub key_passphrase: Option<SecretString>,

    /// Per-attempt timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DeviceDescriptor {
    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    devices: Vec<DeviceDescriptor>,
}

/// The fleet of devices to discover, in polling order.
#[derive(Debug, Clone)]
pub struct Inventory {
    devices: Vec<DeviceDescriptor>,
}

impl Inventory {
    /// Build an inventory from descriptors already in hand.
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self { devices }
    }

    /// Load the inventory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(InventoryError::Io)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load the inventory from any reader yielding the JSON document.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let parsed: InventoryFile =
            serde_json::from_reader(reader).map_err(InventoryError::Parse)?;
        Ok(Self {
            devices: parsed.devices,
        })
    }

    /// Devices in inventory order.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the inventory has no devices.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over the devices in polling order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_load_from_reader() {
        let json = r#"{
            "devices": [
                { "host": "10.0.0.1", "username": "admin", "password": "secret" },
                { "host": "10.0.0.2", "port": 2222, "username": "ops" }
            ]
        }"#;

        let inventory = Inventory::from_reader(json.as_bytes()).unwrap();
        assert_eq!(inventory.len(), 2);

        let first = &inventory.devices()[0];
        assert_eq!(first.host, "10.0.0.1");
        assert_eq!(first.port, 22);
        assert_eq!(
            first.password.as_ref().unwrap().expose_secret(),
            "secret"
        );

        let second = &inventory.devices()[1];
        assert_eq!(second.port, 2222);
        assert!(second.password.is_none());
    }

    #[test]
    fn test_malformed_inventory_is_parse_error() {
        let result = Inventory::from_reader(b"not json".as_slice());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_inventory() {
        let inventory = Inventory::from_reader(br#"{ "devices": [] }"#.as_slice()).unwrap();
        assert!(inventory.is_empty());
    }
}
