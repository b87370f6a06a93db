//! Neighbor-discovery output parsing.
//!
//! Converts one device's raw `show cdp neighbors` style output into typed
//! neighbor rows, and rows into observations ready for the topology
//! builder. Pure transformations: malformed rows are skipped, absent or
//! empty output yields an empty sequence. Distinguishing "no neighbors"
//! from "channel failure" is the channel's job, not the parser's.

use std::sync::LazyLock;

use regex::Regex;

use crate::topology::{NeighborObservation, normalize_hostname};

/// One raw record from a neighbor-discovery command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborRow {
    /// Reported neighbor identity, possibly fully qualified.
    pub neighbor: String,

    /// Interface on the reporting device.
    pub local_interface: String,

    /// Interface on the neighbor.
    pub remote_interface: String,
}

// Interface names come in one or two tokens, with possibly padded
// separation: "Gi0/1", "Gig 0/1", "Gig  0/1", "Eth 1/1.5".
const INTERFACE: &str = r"[A-Za-z][A-Za-z-]*[ \t]*\d+(?:[/.]\d+)*";

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<device>\S+)?\s+(?P<local>{INTERFACE})\s+\d+\s+(?:[A-Za-z](?:\s+[A-Za-z])*\s+)?\S+\s+(?P<remote>{INTERFACE})\s*$"
    ))
    .unwrap()
});

static DEVICE_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\S+)\s*$").unwrap());

static HOSTNAME_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^hostname[ \t]+(\S+)").unwrap());

/// Parse Cisco-style `show cdp neighbors` tabular output into rows.
///
/// Handles the usual quirks of the format: the capability-codes preamble,
/// the column header, device identities long enough to wrap onto their own
/// line, and the trailing entry count. Rows that do not parse are dropped.
pub fn parse_neighbor_table(text: &str) -> Vec<NeighborRow> {
    let mut rows = Vec::new();
    let mut in_table = false;
    // Long device ids are printed alone, with the rest of the row wrapped
    // onto the next line.
    let mut pending_device: Option<String> = None;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if !in_table {
            if line.trim_start().starts_with("Device ID") {
                in_table = true;
            }
            continue;
        }

        if line.starts_with("Total cdp entries") {
            break;
        }

        if let Some(caps) = ROW.captures(line) {
            let neighbor = caps
                .name("device")
                .map(|m| m.as_str().to_string())
                .or_else(|| pending_device.take());

            let Some(neighbor) = neighbor else {
                continue;
            };

            rows.push(NeighborRow {
                neighbor,
                local_interface: squash(&caps["local"]),
                remote_interface: squash(&caps["remote"]),
            });
        } else if let Some(caps) = DEVICE_ONLY.captures(line) {
            pending_device = Some(caps[1].to_string());
        }
        // anything else is a malformed row: skipped
    }

    rows
}

/// Convert one device's neighbor rows into observations.
///
/// Neighbor identities are truncated at the first domain separator and
/// case-folded; rows with an empty identity or interfaces are dropped.
pub fn observations(reporter: &str, rows: &[NeighborRow]) -> Vec<NeighborObservation> {
    let reporter = normalize_hostname(reporter);

    rows.iter()
        .filter_map(|row| {
            let remote = normalize_hostname(&row.neighbor);
            if remote.is_empty()
                || row.local_interface.is_empty()
                || row.remote_interface.is_empty()
            {
                return None;
            }

            Some(NeighborObservation {
                reporter: reporter.clone(),
                remote_identity: remote,
                local_interface: row.local_interface.clone(),
                remote_interface: row.remote_interface.clone(),
            })
        })
        .collect()
}

/// Extract the declared hostname from a configuration dump.
pub fn hostname_from_config(config: &str) -> Option<&str> {
    HOSTNAME_DECL
        .captures(config)
        .map(|caps| caps.get(1).unwrap().as_str())
}

/// Collapse an interface name's internal whitespace ("Gig  0/1" -> "Gig 0/1").
fn squash(interface: &str) -> String {
    interface.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDP_OUTPUT: &str = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge
                  S - Switch, H - Host, I - IGMP, r - Repeater

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
SW2.example.com  Gig 0/1           155             S I    WS-C2960  Gig 0/2
R1               Gig 0/2           134              R     ISR4321   Gig 0/0/1
very-long-device-name.example.com
                 Gig 0/3           178             S I    WS-C3850  Ten 1/1/1

Total cdp entries displayed : 3
";

    #[test]
    fn test_parse_neighbor_table() {
        let rows = parse_neighbor_table(CDP_OUTPUT);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].neighbor, "SW2.example.com");
        assert_eq!(rows[0].local_interface, "Gig 0/1");
        assert_eq!(rows[0].remote_interface, "Gig 0/2");

        assert_eq!(rows[1].neighbor, "R1");
        assert_eq!(rows[1].remote_interface, "Gig 0/0/1");
    }

    #[test]
    fn test_parse_wrapped_device_id() {
        let rows = parse_neighbor_table(CDP_OUTPUT);
        assert_eq!(rows[2].neighbor, "very-long-device-name.example.com");
        assert_eq!(rows[2].local_interface, "Gig 0/3");
        assert_eq!(rows[2].remote_interface, "Ten 1/1/1");
    }

    #[test]
    fn test_parse_padded_interface_names() {
        let text = "\
Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
SW2              Gig  0/1          155             S I    WS-C2960  Gig   0/2
";
        let rows = parse_neighbor_table(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].local_interface, "Gig 0/1");
        assert_eq!(rows[0].remote_interface, "Gig 0/2");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_neighbor_table("").is_empty());
        assert!(parse_neighbor_table("\r\n\r\n").is_empty());
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let text = "\
Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
SW2              Gig 0/1           155             S I    WS-C2960  Gig 0/2
%% garbage line that matches nothing %%
";
        let rows = parse_neighbor_table(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].neighbor, "SW2");
    }

    #[test]
    fn test_observations_normalize_identity() {
        let rows = vec![NeighborRow {
            neighbor: "Core-SW1.example.com".to_string(),
            local_interface: "Gig 0/1".to_string(),
            remote_interface: "Gig 0/2".to_string(),
        }];

        let obs = observations("R1.example.com", &rows);
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].reporter, "r1");
        assert_eq!(obs[0].remote_identity, "core-sw1");
    }

    #[test]
    fn test_observations_drop_empty_identity() {
        let rows = vec![NeighborRow {
            neighbor: ".example.com".to_string(),
            local_interface: "Gig 0/1".to_string(),
            remote_interface: "Gig 0/2".to_string(),
        }];

        assert!(observations("r1", &rows).is_empty());
    }

    #[test]
    fn test_hostname_from_config() {
        let config = "!\nversion 15.2\nservice timestamps\nhostname core-sw1\n!\ninterface Gig0/1\n";
        assert_eq!(hostname_from_config(config), Some("core-sw1"));
    }

    #[test]
    fn test_hostname_missing() {
        assert_eq!(hostname_from_config("interface Gig0/1\n"), None);
        // "hostname" must start the line
        assert_eq!(hostname_from_config(" ip hostname server\n"), None);
    }
}
