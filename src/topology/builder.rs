//! Topology builder: folds observations into the graph.

use log::{debug, trace};

use super::graph::{NeighborObservation, PairKey, TopologyGraph, normalize_hostname};

/// Accumulates neighbor observations into a deduplicated topology graph.
///
/// The builder is a pure accumulator: it performs no I/O and never fails
/// on individual observations (the parser has already filtered malformed
/// records; self-loops are dropped here). It is single-owner by design -
/// workers polling devices in parallel must funnel their observation
/// batches to the one task that owns the builder.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    graph: TopologyGraph,
}

impl TopologyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a device that was successfully polled.
    ///
    /// Creates the node if this is the first sight of it and attaches the
    /// management address. A polled device appears in the graph even when
    /// it reported no neighbors at all.
    pub fn record_device(&mut self, hostname: &str, management_addr: &str) {
        let hostname = normalize_hostname(hostname);
        if hostname.is_empty() {
            return;
        }

        let node = self.graph.ensure_node(&hostname);
        node.management_addr = Some(management_addr.to_string());
    }

    /// Fold one neighbor observation into the graph.
    ///
    /// Both endpoints are normalized and created on first sight. The link
    /// for the unordered pair is created if absent, and the interface on
    /// the reporter's side is set (or overwritten) from this observation.
    /// Feeding the same observation twice leaves the graph unchanged, and
    /// feeding the mirror-image observation from the other side fills in
    /// the remaining interface field of the same link.
    pub fn add_observation(&mut self, obs: &NeighborObservation) {
        let reporter = normalize_hostname(&obs.reporter);
        let remote = normalize_hostname(&obs.remote_identity);

        if reporter.is_empty() || remote.is_empty() {
            return;
        }

        if reporter == remote {
            trace!("dropping self-loop observation from '{reporter}'");
            return;
        }

        self.graph.ensure_node(&reporter).neighbors.insert(remote.clone());
        self.graph.ensure_node(&remote).neighbors.insert(reporter.clone());

        let key = PairKey::new(&reporter, &remote);
        let link = self.graph.ensure_link(key);
        link.set_interface_at(&reporter, obs.local_interface.clone());

        debug!(
            "observed link {} ({}) <-> {} ({})",
            reporter, obs.local_interface, remote, obs.remote_interface
        );
    }

    /// Fold a batch of observations, in order.
    pub fn add_observations<'a>(
        &mut self,
        observations: impl IntoIterator<Item = &'a NeighborObservation>,
    ) {
        for obs in observations {
            self.add_observation(obs);
        }
    }

    /// Return an immutable snapshot of the graph built so far.
    ///
    /// The snapshot is a value copy: further `add_observation` calls keep
    /// mutating the builder but never a previously returned graph.
    pub fn finalize(&self) -> TopologyGraph {
        self.graph.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(reporter: &str, remote: &str, local_if: &str, remote_if: &str) -> NeighborObservation {
        NeighborObservation {
            reporter: reporter.to_string(),
            remote_identity: remote.to_string(),
            local_interface: local_if.to_string(),
            remote_interface: remote_if.to_string(),
        }
    }

    #[test]
    fn test_dedup_commutativity() {
        // The same pair reported from both ends, in either order, yields
        // exactly one link with both interface fields populated.
        for flip in [false, true] {
            let mut builder = TopologyBuilder::new();
            let from_a = obs("A", "B", "Gi0/1", "Gi0/2");
            let from_b = obs("B", "A", "Gi0/2", "Gi0/1");

            if flip {
                builder.add_observation(&from_b);
                builder.add_observation(&from_a);
            } else {
                builder.add_observation(&from_a);
                builder.add_observation(&from_b);
            }

            let graph = builder.finalize();
            assert_eq!(graph.node_count(), 2);
            assert_eq!(graph.link_count(), 1);

            let link = graph.link("a", "b").unwrap();
            assert_eq!(link.interface_at("a"), Some("Gi0/1"));
            assert_eq!(link.interface_at("b"), Some("Gi0/2"));
        }
    }

    #[test]
    fn test_idempotence() {
        let mut once = TopologyBuilder::new();
        once.add_observation(&obs("a", "b", "Gi0/1", "Gi0/2"));

        let mut twice = TopologyBuilder::new();
        twice.add_observation(&obs("a", "b", "Gi0/1", "Gi0/2"));
        twice.add_observation(&obs("a", "b", "Gi0/1", "Gi0/2"));

        assert_eq!(once.finalize(), twice.finalize());
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut builder = TopologyBuilder::new();
        // Identities differ only by domain suffix and case; after
        // normalization this is a self-report.
        builder.add_observation(&obs("core-sw1", "Core-SW1.example.com", "Gi0/1", "Gi0/1"));

        let graph = builder.finalize();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_hostname_normalization_folds_nodes() {
        let mut builder = TopologyBuilder::new();
        builder.add_observation(&obs("r1", "core-sw1.example.com", "Gi0/1", "Gi0/2"));
        builder.add_observation(&obs("r2", "core-sw1", "Gi0/3", "Gi0/4"));

        let graph = builder.finalize();
        assert_eq!(graph.node_count(), 3);
        let node = graph.node("core-sw1").unwrap();
        assert_eq!(node.neighbors.len(), 2);
    }

    #[test]
    fn test_interface_conflict_last_writer_wins() {
        let mut builder = TopologyBuilder::new();
        builder.add_observation(&obs("a", "b", "Gi0/1", "Gi0/2"));
        builder.add_observation(&obs("a", "b", "Gi0/7", "Gi0/2"));

        let graph = builder.finalize();
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.link("a", "b").unwrap().interface_at("a"), Some("Gi0/7"));
    }

    #[test]
    fn test_snapshot_is_value_copy() {
        let mut builder = TopologyBuilder::new();
        builder.add_observation(&obs("a", "b", "Gi0/1", "Gi0/2"));
        let snapshot = builder.finalize();

        builder.add_observation(&obs("b", "c", "Gi0/3", "Gi0/4"));

        // The earlier snapshot is untouched by later observations.
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.link_count(), 1);
        assert_eq!(builder.finalize().node_count(), 3);
    }

    #[test]
    fn test_record_device_without_neighbors() {
        let mut builder = TopologyBuilder::new();
        builder.record_device("Lonely-SW.example.com", "10.0.0.9");

        let graph = builder.finalize();
        let node = graph.node("lonely-sw").unwrap();
        assert_eq!(node.management_addr.as_deref(), Some("10.0.0.9"));
        assert!(node.neighbors.is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_triangle() {
        let mut builder = TopologyBuilder::new();
        builder.add_observations([
            &obs("a", "b", "Gi0/1", "Gi0/2"),
            &obs("b", "c", "Gi0/3", "Gi0/4"),
            &obs("c", "a", "Gi0/5", "Gi0/6"),
            &obs("b", "a", "Gi0/2", "Gi0/1"),
        ]);

        let graph = builder.finalize();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 3);
        assert_eq!(graph.link("a", "b").unwrap().interface_at("b"), Some("Gi0/2"));
        // c->a was only reported from c's side
        let ca = graph.link("c", "a").unwrap();
        assert_eq!(ca.interface_at("c"), Some("Gi0/5"));
        assert_eq!(ca.interface_at("a"), None);
    }
}
