//! Topology rendering.
//!
//! The renderer consumes exactly the shape the builder produces: a set of
//! hostnames and a set of undirected, interface-labeled links. Layout and
//! rasterization belong to whatever consumes the rendered text (Graphviz,
//! in the DOT case).

use std::fmt::Write;

use crate::topology::TopologyGraph;

/// Trait for topology renderers.
pub trait TopologyRenderer {
    /// Render the graph to the target format.
    fn render(&self, graph: &TopologyGraph) -> String;
}

/// Graphviz DOT renderer.
///
/// Emits one `graph` block with a node per device and an edge per link.
/// Interface names are attached as `taillabel`/`headlabel`, one per end of
/// the edge, mirroring how each side reported the link. Output order
/// follows discovery order, so rendering is deterministic for a given run.
#[derive(Debug, Clone)]
pub struct DotRenderer {
    /// Graph name in the DOT header.
    pub graph_name: String,
}

impl Default for DotRenderer {
    fn default() -> Self {
        Self {
            graph_name: "topology".to_string(),
        }
    }
}

impl DotRenderer {
    /// Create a renderer with the default graph name.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopologyRenderer for DotRenderer {
    fn render(&self, graph: &TopologyGraph) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "graph \"{}\" {{", escape(&self.graph_name));
        let _ = writeln!(out, "    node [shape=box];");

        for node in graph.nodes() {
            match &node.management_addr {
                Some(addr) => {
                    let _ = writeln!(
                        out,
                        "    \"{}\" [label=\"{}\\n{}\"];",
                        escape(&node.hostname),
                        escape(&node.hostname),
                        escape(addr)
                    );
                }
                None => {
                    let _ = writeln!(out, "    \"{}\";", escape(&node.hostname));
                }
            }
        }

        for link in graph.links() {
            let (a, b) = link.endpoints();
            let tail = link.interface_at(a).unwrap_or("");
            let head = link.interface_at(b).unwrap_or("");
            let _ = writeln!(
                out,
                "    \"{}\" -- \"{}\" [taillabel=\"{}\", headlabel=\"{}\"];",
                escape(a),
                escape(b),
                escape(tail),
                escape(head)
            );
        }

        out.push_str("}\n");
        out
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NeighborObservation, TopologyBuilder};

    fn sample_graph() -> TopologyGraph {
        let mut builder = TopologyBuilder::new();
        builder.record_device("r1", "10.0.0.1");
        builder.add_observation(&NeighborObservation {
            reporter: "r1".to_string(),
            remote_identity: "sw1".to_string(),
            local_interface: "Gi0/1".to_string(),
            remote_interface: "Gi0/2".to_string(),
        });
        builder.finalize()
    }

    #[test]
    fn test_dot_output() {
        let dot = DotRenderer::new().render(&sample_graph());

        assert!(dot.starts_with("graph \"topology\" {"));
        assert!(dot.contains("\"r1\" [label=\"r1\\n10.0.0.1\"];"));
        assert!(dot.contains("\"sw1\";"));
        assert!(dot.contains("\"r1\" -- \"sw1\" [taillabel=\"Gi0/1\", headlabel=\"\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_empty_graph() {
        let dot = DotRenderer::new().render(&TopologyGraph::new());
        assert!(dot.contains("graph \"topology\" {"));
        assert!(!dot.contains("--"));
    }
}
