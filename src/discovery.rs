//! Discovery orchestration.
//!
//! Walks the inventory in order, polls each device through the command
//! channel, folds the parsed observations into one topology builder, and
//! archives what was collected. A single unreachable device never aborts
//! the pass; the graph is finalized once, after every device has been
//! attempted.

use std::time::{Duration, Instant};

use chrono::Local;
use log::{info, warn};

use crate::archive::ArchiveSink;
use crate::channel::{CommandChannel, CommandOutput};
use crate::error::{ChannelError, DiscoveryError};
use crate::inventory::{DeviceDescriptor, Inventory};
use crate::parser;
use crate::topology::{TopologyBuilder, TopologyGraph, normalize_hostname};

/// Default neighbor-discovery command.
pub const DEFAULT_NEIGHBOR_COMMAND: &str = "show cdp neighbors";

/// Default configuration-dump command.
pub const DEFAULT_CONFIG_COMMAND: &str = "show running-config";

/// Instrumentation hook invoked around discovery operations.
///
/// All methods have no-op defaults; implement only what you need.
pub trait DiscoveryObserver: Send + Sync {
    /// Called after each command execution on a device.
    fn command_completed(&self, _host: &str, _command: &str, _elapsed: Duration, _success: bool) {}

    /// Called once when the pass is complete and the graph finalized.
    fn pass_completed(&self, _elapsed: Duration, _graph: &TopologyGraph) {}
}

/// Observer that reports timings through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl DiscoveryObserver for LogObserver {
    fn command_completed(&self, host: &str, command: &str, elapsed: Duration, success: bool) {
        info!(
            "'{command}' on {host} {} in {elapsed:?}",
            if success { "completed" } else { "failed" }
        );
    }

    fn pass_completed(&self, elapsed: Duration, graph: &TopologyGraph) {
        info!(
            "discovery pass completed in {elapsed:?}: {} nodes, {} links",
            graph.node_count(),
            graph.link_count()
        );
    }
}

/// How one device fared during the pass.
#[derive(Debug)]
pub enum DeviceStatus {
    /// The device answered; its observations are in the graph.
    Discovered {
        /// Canonical hostname extracted from the device's configuration.
        hostname: String,
    },

    /// The device exhausted the channel's retry budget.
    Unreachable {
        /// The terminal channel error.
        error: ChannelError,
    },
}

/// Per-device outcome of a discovery pass.
#[derive(Debug)]
pub struct DeviceOutcome {
    /// The inventory host this outcome belongs to.
    pub host: String,

    /// What happened.
    pub status: DeviceStatus,
}

/// Result of one discovery pass.
#[derive(Debug)]
pub struct DiscoveryReport {
    /// The deduplicated topology graph.
    pub graph: TopologyGraph,

    /// One outcome per inventory device, in inventory order.
    pub outcomes: Vec<DeviceOutcome>,
}

impl DiscoveryReport {
    /// Number of devices that answered.
    pub fn reached(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeviceStatus::Discovered { .. }))
            .count()
    }

    /// Number of devices that did not.
    pub fn unreachable(&self) -> usize {
        self.outcomes.len() - self.reached()
    }
}

/// Discovery orchestrator over a command channel.
///
/// The orchestrator owns the one [`TopologyBuilder`] for the pass and
/// serializes every observation into it; devices are polled sequentially
/// in inventory order.
pub struct Discovery<C> {
    channel: C,
    neighbor_command: String,
    config_command: String,
    observer: Option<Box<dyn DiscoveryObserver>>,
}

impl<C: CommandChannel> Discovery<C> {
    /// Create an orchestrator with the default Cisco-style commands.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            neighbor_command: DEFAULT_NEIGHBOR_COMMAND.to_string(),
            config_command: DEFAULT_CONFIG_COMMAND.to_string(),
            observer: None,
        }
    }

    /// Override the neighbor-discovery command.
    pub fn with_neighbor_command(mut self, command: impl Into<String>) -> Self {
        self.neighbor_command = command.into();
        self
    }

    /// Override the configuration-dump command.
    pub fn with_config_command(mut self, command: impl Into<String>) -> Self {
        self.config_command = command.into();
        self
    }

    /// Attach an instrumentation observer.
    pub fn with_observer(mut self, observer: impl DiscoveryObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Run one discovery pass over the inventory.
    ///
    /// Fails up front on an empty inventory, and after the fact if not a
    /// single device could be reached. Anything in between is a partial
    /// result: unreachable devices are skipped and recorded in the report.
    pub async fn run<S: ArchiveSink + Send>(
        &mut self,
        inventory: &Inventory,
        archive: &mut S,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        if inventory.is_empty() {
            return Err(DiscoveryError::EmptyInventory);
        }

        let start = Instant::now();
        let mut builder = TopologyBuilder::new();
        let mut outcomes = Vec::with_capacity(inventory.len());
        let mut report_lines = Vec::new();

        for device in inventory.iter() {
            match self
                .poll_device(device, &mut builder, archive, &mut report_lines)
                .await
            {
                Ok(hostname) => {
                    outcomes.push(DeviceOutcome {
                        host: device.host.clone(),
                        status: DeviceStatus::Discovered { hostname },
                    });
                }
                Err(error) => {
                    warn!("skipping {}: {error}", device.host);
                    outcomes.push(DeviceOutcome {
                        host: device.host.clone(),
                        status: DeviceStatus::Unreachable { error },
                    });
                }
            }
        }

        let report = DiscoveryReport {
            graph: builder.finalize(),
            outcomes,
        };

        if report.reached() == 0 {
            return Err(DiscoveryError::AllDevicesUnreachable {
                attempted: inventory.len(),
            });
        }

        // Archival is best-effort: a failed report write never costs the
        // caller the graph that was just built.
        if let Err(e) = archive.append_connectivity_report(Local::now(), &report_lines) {
            warn!("connectivity report not archived: {e}");
        }

        if let Some(ref observer) = self.observer {
            observer.pass_completed(start.elapsed(), &report.graph);
        }

        Ok(report)
    }

    /// Poll one device: config dump, hostname, snapshot, neighbors.
    async fn poll_device<S: ArchiveSink + Send>(
        &mut self,
        device: &DeviceDescriptor,
        builder: &mut TopologyBuilder,
        archive: &mut S,
        report_lines: &mut Vec<String>,
    ) -> Result<String, ChannelError> {
        let config_command = self.config_command.clone();
        let config = self.execute(device, &config_command).await?;

        // Devices answer under their configured hostname, not the
        // management address we dialed; fall back to the address when the
        // dump has no hostname declaration.
        let hostname = parser::hostname_from_config(&config.result)
            .map(normalize_hostname)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| normalize_hostname(&device.host));

        if let Err(e) = archive.write_config_snapshot(&hostname, &config.result) {
            warn!("config snapshot for {hostname} not archived: {e}");
        }

        builder.record_device(&hostname, &device.host);

        let neighbor_command = self.neighbor_command.clone();
        let neighbors = self.execute(device, &neighbor_command).await?;

        let rows = parser::parse_neighbor_table(&neighbors.result);
        let observations = parser::observations(&hostname, &rows);

        report_lines.push(format!("Neighbors for {} ({})", hostname, device.host));
        for obs in &observations {
            report_lines.push(format!(
                "{}\tlocal int: {}\tneighbor int: {}",
                obs.remote_identity, obs.local_interface, obs.remote_interface
            ));
        }

        builder.add_observations(&observations);
        Ok(hostname)
    }

    async fn execute(
        &mut self,
        device: &DeviceDescriptor,
        command: &str,
    ) -> Result<CommandOutput, ChannelError> {
        let start = Instant::now();
        let result = self.channel.execute(device, command).await;

        if let Some(ref observer) = self.observer {
            observer.command_completed(&device.host, command, start.elapsed(), result.is_ok());
        }

        result
    }
}
