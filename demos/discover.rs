//! Fleet Discovery Example
//!
//! Loads a device inventory, discovers the fleet topology over SSH,
//! archives the connectivity report and config snapshots, and writes a
//! Graphviz DOT file of the result.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example discover -- --inventory devices.json --archive ./archive --out topology.dot
//! ```
//!
//! Render the output with Graphviz:
//!
//! ```bash
//! dot -Tpng topology.dot -o topology.png
//! ```

use std::env;
use std::path::PathBuf;

use topolink::{
    Discovery, DotRenderer, FsArchive, Inventory, LogObserver, RetryingChannel, SshChannel,
    TopologyRenderer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Loading inventory from {}...", args.inventory.display());
    let inventory = Inventory::load(&args.inventory)?;
    println!("{} devices to poll", inventory.len());

    let channel = RetryingChannel::new(SshChannel::new()?);
    let mut archive = FsArchive::new(&args.archive);

    let report = Discovery::new(channel)
        .with_observer(LogObserver)
        .run(&inventory, &mut archive)
        .await?;

    println!(
        "Discovered {} nodes and {} links ({} of {} devices reachable)",
        report.graph.node_count(),
        report.graph.link_count(),
        report.reached(),
        inventory.len()
    );

    for outcome in &report.outcomes {
        match &outcome.status {
            topolink::DeviceStatus::Discovered { hostname } => {
                println!("  {} -> {}", outcome.host, hostname);
            }
            topolink::DeviceStatus::Unreachable { error } => {
                println!("  {} UNREACHABLE: {}", outcome.host, error);
            }
        }
    }

    let dot = DotRenderer::new().render(&report.graph);
    std::fs::write(&args.out, dot)?;
    println!("Wrote {}", args.out.display());

    Ok(())
}

/// Simple argument parser
struct Args {
    inventory: PathBuf,
    archive: PathBuf,
    out: PathBuf,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut inventory = PathBuf::from("devices.json");
        let mut archive = PathBuf::from("archive");
        let mut out = PathBuf::from("topology.dot");

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--inventory" | "-i" => {
                    i += 1;
                    if i < args.len() {
                        inventory = PathBuf::from(&args[i]);
                    }
                }
                "--archive" | "-a" => {
                    i += 1;
                    if i < args.len() {
                        archive = PathBuf::from(&args[i]);
                    }
                }
                "--out" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        out = PathBuf::from(&args[i]);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            inventory,
            archive,
            out,
        }
    }

    fn print_help() {
        println!(
            r#"topolink fleet discovery example

USAGE:
    cargo run --example discover -- [OPTIONS]

OPTIONS:
    -i, --inventory <PATH>   Inventory JSON file [default: devices.json]
    -a, --archive <PATH>     Archive directory [default: archive]
    -o, --out <PATH>         Output DOT file [default: topology.dot]
    --help                   Print this help message

INVENTORY FORMAT:
    {{
      "devices": [
        {{ "host": "10.0.0.1", "username": "admin", "password": "secret" }},
        {{ "host": "10.0.0.2", "username": "admin", "private_key": "/home/net/.ssh/id_ed25519" }}
      ]
    }}
"#
        );
    }
}
