//! Phase 2: The Brain
//!
//! Responsible for:
//! - Backtracking over simple paths to flag suspicious chains and cycles
//! - Branch-and-bound search for the cheapest path under a fee ceiling
//! - Sweeping the whole graph for distinct cycles

mod chain_explorer;
mod cycle_scan;
mod metrics;
mod optimal_path;

pub use chain_explorer::{
    find_suspicious_chains, score_path, sort_chains, ChainExploration, ChainExplorer, ChainKind,
    ExplorationReason, SuspiciousChain, MAX_CHAIN_PATH_LEN, MIN_CHAIN_LEN,
};
pub use cycle_scan::{cycle_candidates, scan_cycles, CycleScanOptions};
pub use metrics::{PruneReason, SearchMetrics};
pub use optimal_path::{
    find_optimal_path, CeilingResult, Heuristic, OptimalPathResult, OptimalPathSearch, PathStep,
    ZeroHeuristic, MAX_SEARCH_PATH_LEN,
};
