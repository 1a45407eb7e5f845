//! Chain Sleuth - Transaction Graph Forensics CLI
//!
//! Run with: cargo run -- chains --graph transfers.json --start <wallet>

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chain_sleuth::brain::{scan_cycles, ChainExplorer, OptimalPathSearch, SuspiciousChain};
use chain_sleuth::cartographer::TransactionGraph;
use chain_sleuth::config::{Config, FindingLog};
use chain_sleuth::report;

#[derive(Parser, Debug)]
#[command(name = "chain-sleuth", version, about = "Forensic search over wallet transfer graphs")]
struct Cli {
    /// TOML config file; environment variables are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of the console report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flag suspicious chains and cycles leaving a wallet
    Chains {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        start: String,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Sweep the whole graph for distinct cycles
    Cycles {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        max_cycles: Option<usize>,
    },
    /// Cheapest path between two wallets under a fee ceiling
    Path {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        max_cost: Option<f64>,
        /// Allow walking transfers backwards
        #[arg(long)]
        bidirectional: bool,
    },
    /// Same query over every configured cost ceiling
    Scenarios {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Allow walking transfers backwards
        #[arg(long)]
        bidirectional: bool,
    },
    /// Cheapest path with no ceiling at all
    Cheapest {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Allow walking transfers backwards
        #[arg(long)]
        bidirectional: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }
    Ok(config)
}

fn load_graph(path: &PathBuf) -> Result<TransactionGraph> {
    let graph = TransactionGraph::load_json(path)
        .map_err(|e| eyre!("Could not load graph from {}: {}", path.display(), e))?;

    if graph.is_empty() {
        warn!("Graph {} has no edges; every search will come back empty", path.display());
    }
    Ok(graph)
}

/// Graph for the path commands; reversed edges join when either the flag or config asks.
fn load_path_graph(path: &PathBuf, bidirectional: bool, config: &Config) -> Result<TransactionGraph> {
    let graph = load_graph(path)?;
    if bidirectional || config.bidirectional_paths {
        info!("Walking transfers in both directions");
        return Ok(graph.with_reverse_edges());
    }
    Ok(graph)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn log_chains(config: &Config, search: &str, subject: &str, chains: &[SuspiciousChain]) {
    if !config.findings_log {
        return;
    }

    for chain in chains {
        let entry = FindingLog {
            timestamp: Utc::now(),
            search: search.to_string(),
            subject: subject.to_string(),
            path: chain.path.clone(),
            label: chain.kind.to_string(),
            score: chain.suspicion_level,
            total_amount: chain.total_amount,
        };
        if let Err(e) = entry.append_to_file(&config.findings_log_path) {
            warn!("Failed to write findings log: {}", e);
            return;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chain_sleuth=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    if !cli.json {
        report::print_banner();
        config.print_summary();
    }

    match cli.command {
        Command::Chains { graph, start, depth } => {
            if let Some(depth) = depth {
                config.max_depth = depth;
                config.validate()?;
            }

            let full = load_graph(&graph)?;
            let hops = config.effective_neighborhood_hops();
            let view = full.neighborhood(&start, hops);
            info!(
                "Neighborhood of {}: {} wallets, {} edges within {} hops",
                start,
                view.wallet_count(),
                view.edge_count(),
                hops
            );

            let exploration = ChainExplorer::new(&view, config.max_depth).explore(&start);
            log_chains(&config, "chains", &start, &exploration.chains);

            if cli.json {
                print_json(&exploration)?;
            } else {
                report::print_exploration(&exploration, config.report_top);
            }
        }
        Command::Cycles { graph, max_cycles } => {
            if let Some(max_cycles) = max_cycles {
                config.max_cycles = max_cycles;
                config.validate()?;
            }

            let view = load_graph(&graph)?;
            let cycles = scan_cycles(&view, config.cycle_scan_options());
            log_chains(&config, "cycles", "*", &cycles);

            if cli.json {
                print_json(&cycles)?;
            } else {
                report::print_cycles(&cycles, config.report_top);
            }
        }
        Command::Path { graph, source, target, max_cost, bidirectional } => {
            if let Some(max_cost) = max_cost {
                config.max_cost = max_cost;
                config.validate()?;
            }

            let view = load_path_graph(&graph, bidirectional, &config)?;

            let result = OptimalPathSearch::new(&view).find_optimal_path(&source, &target, config.max_cost);

            if cli.json {
                print_json(&serde_json::json!({
                    "result": &result,
                    "steps": result.path_details(&view),
                }))?;
            } else {
                report::print_path(&result, &view);
            }
        }
        Command::Scenarios { graph, source, target, bidirectional } => {
            let view = load_path_graph(&graph, bidirectional, &config)?;

            let results = OptimalPathSearch::new(&view).find_across_ceilings(&source, &target, &config.cost_ceilings);

            if cli.json {
                print_json(&results)?;
            } else {
                report::print_ceilings(&results);
            }
        }
        Command::Cheapest { graph, source, target, bidirectional } => {
            let view = load_path_graph(&graph, bidirectional, &config)?;

            let result = OptimalPathSearch::new(&view).find_cheapest_path(&source, &target);

            if cli.json {
                print_json(&result)?;
            } else {
                report::print_path(&result, &view);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bidirectional_flag(args: &[&str]) -> bool {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Command::Path { bidirectional, .. }
            | Command::Scenarios { bidirectional, .. }
            | Command::Cheapest { bidirectional, .. } => bidirectional,
            other => panic!("not a path command: {:?}", other),
        }
    }

    #[test]
    fn test_path_commands_accept_bidirectional() {
        for command in ["path", "scenarios", "cheapest"] {
            let base = ["chain-sleuth", command, "--graph", "g.json", "--source", "A", "--target", "B"];
            assert!(!bidirectional_flag(&base));

            let mut with_flag = base.to_vec();
            with_flag.push("--bidirectional");
            assert!(bidirectional_flag(&with_flag), "{} ignored --bidirectional", command);
        }
    }

    #[test]
    fn test_reverse_edges_make_target_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transfers.json");
        std::fs::write(&file, r#"[{"from": "B", "to": "A", "amount": 5.0, "cost": 1.0}]"#).unwrap();

        let config = Config::default();
        let forward = load_path_graph(&file, false, &config).unwrap();
        let both = load_path_graph(&file, true, &config).unwrap();

        assert!(!OptimalPathSearch::new(&forward).find_cheapest_path("A", "B").path_found);
        assert!(OptimalPathSearch::new(&both).find_cheapest_path("A", "B").path_found);
    }
}
