//! Graph data model: nodes, links, and the topology graph.

use indexmap::{IndexMap, IndexSet};

/// Normalize a device identity to its canonical node key.
///
/// The identity is truncated at the first domain separator and case-folded,
/// so `Core-SW1.example.com` and `core-sw1` name the same node.
pub fn normalize_hostname(identity: &str) -> String {
    let bare = identity.split('.').next().unwrap_or(identity);
    bare.trim().to_ascii_lowercase()
}

/// One reported neighbor relationship, from the reporting device's point
/// of view. Consumed once by the [`TopologyBuilder`](super::TopologyBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborObservation {
    /// Hostname of the device that ran the discovery command.
    pub reporter: String,

    /// Reported neighbor identity, possibly fully qualified.
    pub remote_identity: String,

    /// Interface on the reporter's side of the link.
    pub local_interface: String,

    /// Interface on the neighbor's side, as the reporter saw it.
    pub remote_interface: String,
}

/// Canonical key for an unordered hostname pair.
///
/// The two hostnames are sorted lexically before being combined, so a link
/// reported as `(a, b)` and later as `(b, a)` resolves to the same key.
/// This is the dedup rule everything else hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: String,
    hi: String,
}

impl PairKey {
    /// Build the key for two normalized hostnames, in either order.
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                lo: a.to_string(),
                hi: b.to_string(),
            }
        } else {
            Self {
                lo: b.to_string(),
                hi: a.to_string(),
            }
        }
    }
}

/// One managed network element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Canonical hostname, the unique node key.
    pub hostname: String,

    /// Management address, known once the device itself has been polled.
    pub management_addr: Option<String>,

    /// Hostnames this device has been observed adjacent to.
    pub neighbors: IndexSet<String>,
}

impl Node {
    fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            management_addr: None,
            neighbors: IndexSet::new(),
        }
    }
}

/// One physical or logical connection between two devices.
///
/// A link is the canonical union of the two one-sided reports: the report
/// from `a` naming `b` fills `interface_a`, and the report from `b` naming
/// `a` fills `interface_b`. The two normally agree but are not required to
/// arrive together, so either side may be unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    a: String,
    b: String,
    interface_a: Option<String>,
    interface_b: Option<String>,
}

impl Link {
    pub(crate) fn new(key: &PairKey) -> Self {
        Self {
            a: key.lo.clone(),
            b: key.hi.clone(),
            interface_a: None,
            interface_b: None,
        }
    }

    /// The two endpoints, in canonical (sorted) order.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }

    /// The interface on `host`'s side of the link, if observed.
    pub fn interface_at(&self, host: &str) -> Option<&str> {
        if host == self.a {
            self.interface_a.as_deref()
        } else if host == self.b {
            self.interface_b.as_deref()
        } else {
            None
        }
    }

    /// Record the interface observed from `host`'s own report.
    ///
    /// Later reports from the same side overwrite the field, which makes
    /// re-adding an observation idempotent and resolves conflicting
    /// reports deterministically (last writer wins).
    pub(crate) fn set_interface_at(&mut self, host: &str, interface: impl Into<String>) {
        if host == self.a {
            self.interface_a = Some(interface.into());
        } else if host == self.b {
            self.interface_b = Some(interface.into());
        }
    }
}

/// The deduplicated node/link database for one discovery run.
///
/// Invariants: node identities are unique and normalized; at most one link
/// exists per unordered hostname pair; no self-loops. Partial results are
/// valid - a graph built from a fleet where some devices never answered
/// still holds everything observed from the devices that did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyGraph {
    nodes: IndexMap<String, Node>,
    links: IndexMap<PairKey, Link>,
}

impl TopologyGraph {
    /// Construct an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by normalized hostname.
    pub fn node(&self, hostname: &str) -> Option<&Node> {
        self.nodes.get(hostname)
    }

    /// Get the link between two hostnames, in either order.
    pub fn link(&self, a: &str, b: &str) -> Option<&Link> {
        self.links.get(&PairKey::new(a, b))
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Links in discovery order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the graph holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn ensure_node(&mut self, hostname: &str) -> &mut Node {
        self.nodes
            .entry(hostname.to_string())
            .or_insert_with(|| Node::new(hostname))
    }

    pub(crate) fn ensure_link(&mut self, key: PairKey) -> &mut Link {
        self.links
            .entry(key.clone())
            .or_insert_with(|| Link::new(&key))
    }
}
