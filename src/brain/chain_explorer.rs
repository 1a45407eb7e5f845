//! Chain Explorer - Backtracking Edition
//!
//! Step 2.1: The Tracker
//!
//! Depth-bounded DFS over simple paths leaving a start wallet. Every
//! closure back onto the current path is reported as a cycle, and every
//! finished path of three or more wallets is scored by shape.
//!
//! The walk mutates a single `path`/`visited` pair in place and rolls it
//! back after each recursive call, so memory stays O(depth).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

use super::{PruneReason, SearchMetrics};
use crate::cartographer::{Address, TransactionGraph};

/// Paths longer than this stop growing, whatever the requested depth
pub const MAX_CHAIN_PATH_LEN: usize = 20;

/// Shorter paths are never scored
pub const MIN_CHAIN_LEN: usize = 3;

const CYCLE_SUSPICION: f64 = 0.95;
const MIN_SUSPICION: f64 = 0.3;

// ============================================
// RESULT TYPES
// ============================================

/// Shape of a suspicious chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainKind {
    /// Funds come back to a wallet already on the path
    Cycle,
    /// Long sequential forwarding (5+ wallets)
    PeelChain,
    /// Mid-length fan-through (4 to 6 wallets)
    RapidRedistribution,
    LinearChain,
    /// Reserved for external mixing detectors; never produced by the explorer
    MixingPattern,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainKind::Cycle => write!(f, "CYCLE"),
            ChainKind::PeelChain => write!(f, "PEEL_CHAIN"),
            ChainKind::RapidRedistribution => write!(f, "RAPID_REDISTRIBUTION"),
            ChainKind::LinearChain => write!(f, "LINEAR_CHAIN"),
            ChainKind::MixingPattern => write!(f, "MIXING_PATTERN"),
        }
    }
}

/// Why a path was handed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplorationReason {
    MaxDepthReached,
    DeadEnd,
    ExploredFully,
}

impl fmt::Display for ExplorationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationReason::MaxDepthReached => write!(f, "max depth reached"),
            ExplorationReason::DeadEnd => write!(f, "dead end"),
            ExplorationReason::ExploredFully => write!(f, "explored fully"),
        }
    }
}

/// A chain of wallets flagged by the explorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousChain {
    pub path: Vec<Address>,
    pub kind: ChainKind,
    /// Always within [0, 1]
    pub suspicion_level: f64,
    pub total_amount: f64,
    pub depth: usize,
    pub description: String,
}

impl SuspiciousChain {
    pub fn is_cycle(&self) -> bool {
        self.kind == ChainKind::Cycle
    }

    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn format_path(&self) -> String {
        self.path.join(" → ")
    }
}

/// Everything one exploration produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainExploration {
    pub start: Address,
    pub max_depth: usize,
    /// Sorted by descending suspicion
    pub chains: Vec<SuspiciousChain>,
    pub metrics: SearchMetrics,
    pub execution_time_ms: u64,
}

impl ChainExploration {
    pub fn cycles(&self) -> impl Iterator<Item = &SuspiciousChain> {
        self.chains.iter().filter(|c| c.is_cycle())
    }
}

// ============================================
// EXPLORER
// ============================================

/// Backtracking explorer over a read-only transaction graph
pub struct ChainExplorer<'a> {
    graph: &'a TransactionGraph,
    max_depth: usize,
}

impl<'a> ChainExplorer<'a> {
    pub fn new(graph: &'a TransactionGraph, max_depth: usize) -> Self {
        Self { graph, max_depth }
    }

    /// Explore every simple path from `start` up to `max_depth` hops.
    pub fn explore(&self, start: &str) -> ChainExploration {
        let started = Instant::now();
        info!(
            "Starting backtracking from wallet {} with depth {}",
            start, self.max_depth
        );

        let mut chains = Vec::new();
        let mut metrics = SearchMetrics::new();
        let mut path: Vec<Address> = vec![start.to_string()];
        let mut visited: HashSet<Address> = HashSet::from([start.to_string()]);

        self.backtrack(start, &mut path, &mut visited, self.max_depth, &mut chains, &mut metrics);

        sort_chains(&mut chains);

        let execution_time_ms = started.elapsed().as_millis() as u64;
        info!("Backtracking finished in {}ms", execution_time_ms);
        info!(
            "  {} paths explored, {} backtracks, {} cycles detected, {} chains flagged",
            metrics.paths_explored,
            metrics.backtrack_count,
            metrics.cycles_detected,
            chains.len()
        );

        ChainExploration {
            start: start.to_string(),
            max_depth: self.max_depth,
            chains,
            metrics,
            execution_time_ms,
        }
    }

    fn backtrack(
        &self,
        current: &str,
        path: &mut Vec<Address>,
        visited: &mut HashSet<Address>,
        remaining_depth: usize,
        chains: &mut Vec<SuspiciousChain>,
        metrics: &mut SearchMetrics,
    ) {
        metrics.paths_explored += 1;

        if remaining_depth == 0 {
            chains.extend(self.classify(path, ExplorationReason::MaxDepthReached));
            return;
        }

        let edges = self.graph.edges_from(current);
        if edges.is_empty() {
            chains.extend(self.classify(path, ExplorationReason::DeadEnd));
            return;
        }

        for edge in edges {
            let next = edge.to.as_str();

            // Closure onto the current path; never recurse along it
            if visited.contains(next) {
                metrics.cycles_detected += 1;
                chains.extend(self.close_cycle(path, next));
                continue;
            }

            if path.len() > MAX_CHAIN_PATH_LEN {
                debug!("Path length cap hit at {}, not extending to {}", current, next);
                metrics.record_prune(PruneReason::DepthCap);
                continue;
            }

            path.push(next.to_string());
            visited.insert(next.to_string());

            self.backtrack(next, path, visited, remaining_depth - 1, chains, metrics);

            path.pop();
            visited.remove(next);
            metrics.backtrack_count += 1;
        }

        if path.len() >= MIN_CHAIN_LEN {
            chains.extend(self.classify(path, ExplorationReason::ExploredFully));
        }
    }

    /// Build the loop from `next`'s first occurrence back to itself.
    fn close_cycle(&self, path: &[Address], next: &str) -> Option<SuspiciousChain> {
        let start_index = path.iter().position(|w| w == next)?;

        let mut cycle_path = path[start_index..].to_vec();
        cycle_path.push(next.to_string());

        // A self-loop closes as [A, A]; too short to report
        if cycle_path.len() < MIN_CHAIN_LEN {
            debug!("Self-loop on {} counted but not reported", next);
            return None;
        }

        debug!("Cycle closed: {}", cycle_path.join(" → "));

        Some(SuspiciousChain {
            total_amount: self.graph.path_amount(&cycle_path),
            depth: path.len() - start_index,
            path: cycle_path,
            kind: ChainKind::Cycle,
            suspicion_level: CYCLE_SUSPICION,
            description: "Cycle detected: funds return to origin".to_string(),
        })
    }

    fn classify(&self, path: &[Address], reason: ExplorationReason) -> Option<SuspiciousChain> {
        let (kind, suspicion_level) = score_path(path.len())?;

        Some(SuspiciousChain {
            path: path.to_vec(),
            kind,
            suspicion_level,
            total_amount: self.graph.path_amount(path),
            depth: path.len(),
            description: format!("Suspicious chain detected: {}", reason),
        })
    }
}

/// Score a non-cycle path by its length alone.
///
/// Returns `None` for paths that are too short or not suspicious enough.
pub fn score_path(len: usize) -> Option<(ChainKind, f64)> {
    if len < MIN_CHAIN_LEN {
        return None;
    }

    let mut level = 0.0;
    let mut kind = ChainKind::LinearChain;

    if len >= 5 {
        level += 0.3;
        kind = ChainKind::PeelChain;
    }
    // Overrides PeelChain when both apply
    if (4..=6).contains(&len) {
        level += 0.2;
        kind = ChainKind::RapidRedistribution;
    }
    level += 0.1 * len as f64;

    if level < MIN_SUSPICION {
        return None;
    }

    Some((kind, level.clamp(0.0, 1.0)))
}

/// Descending suspicion, then shorter depth, then lexicographic path.
pub fn sort_chains(chains: &mut [SuspiciousChain]) {
    chains.sort_by(|a, b| {
        b.suspicion_level
            .total_cmp(&a.suspicion_level)
            .then_with(|| a.depth.cmp(&b.depth))
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Flag suspicious chains reachable from `start` within `max_depth` hops.
pub fn find_suspicious_chains(
    graph: &TransactionGraph,
    start: &str,
    max_depth: usize,
) -> Vec<SuspiciousChain> {
    ChainExplorer::new(graph, max_depth).explore(start).chains
}
