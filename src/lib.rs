//! Chain Sleuth - forensic search over wallet transfer graphs
//!
//! Two exhaustive searches share one read-only adjacency-list view:
//!
//! - [`brain::ChainExplorer`] backtracks through simple paths and flags
//!   cycles, peel chains and rapid redistribution
//! - [`brain::OptimalPathSearch`] finds the cheapest path between two
//!   wallets under a hard fee ceiling
//!
//! ```no_run
//! use chain_sleuth::brain::{find_optimal_path, find_suspicious_chains};
//! use chain_sleuth::cartographer::TransactionGraph;
//!
//! fn main() -> eyre::Result<()> {
//!     let graph = TransactionGraph::load_json("transfers.json")?;
//!     let chains = find_suspicious_chains(&graph, "wallet-a", 5);
//!     let route = find_optimal_path(&graph, "wallet-a", "wallet-d", 100.0);
//!     println!("{} chains, path found: {}", chains.len(), route.path_found);
//!     Ok(())
//! }
//! ```

pub mod brain;
pub mod cartographer;
pub mod config;
pub mod report;

pub use brain::{
    ChainKind, ChainExplorer, OptimalPathResult, OptimalPathSearch, SearchMetrics, SuspiciousChain,
};
pub use cartographer::{Address, Edge, TransactionGraph, Transfer};
pub use config::Config;
