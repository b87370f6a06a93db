//! # Topolink
//!
//! Async network topology discovery and mapping over SSH.
//!
//! Topolink polls a fleet of network devices, parses their neighbor-discovery
//! output, and folds the one-sided reports into a deduplicated, undirected
//! topology graph: each physical link appears exactly once no matter which
//! side reported it, with the interface name observed from each end.
//!
//! ## Features
//!
//! - Async SSH command channel via russh, with bounded per-device retry
//! - Cisco-style `show cdp neighbors` table parsing
//! - Order-independent link deduplication (sorted-pair keys)
//! - Connectivity report and config snapshot archival
//! - Graphviz DOT rendering with per-end interface labels
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topolink::{Discovery, DotRenderer, FsArchive, Inventory, RetryingChannel, SshChannel, TopologyRenderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), topolink::Error> {
//!     let inventory = Inventory::load("devices.json")?;
//!     let channel = RetryingChannel::new(SshChannel::new()?);
//!     let mut archive = FsArchive::new("archive");
//!
//!     let report = Discovery::new(channel)
//!         .run(&inventory, &mut archive)
//!         .await?;
//!
//!     let dot = DotRenderer::new().render(&report.graph);
//!     println!("{dot}");
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod channel;
pub mod discovery;
pub mod error;
pub mod inventory;
pub mod parser;
pub mod render;
pub mod topology;

// Re-export main types for convenience
pub use archive::{ArchiveSink, FsArchive, NullArchive};
pub use channel::{CommandChannel, CommandOutput, RetryingChannel, SshChannel, SshChannelConfig};
pub use discovery::{
    DeviceOutcome, DeviceStatus, Discovery, DiscoveryObserver, DiscoveryReport, LogObserver,
};
pub use error::Error;
pub use inventory::{DeviceDescriptor, Inventory};
pub use parser::NeighborRow;
pub use render::{DotRenderer, TopologyRenderer};
pub use topology::{Link, NeighborObservation, Node, TopologyBuilder, TopologyGraph};
