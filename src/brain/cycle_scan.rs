//! Network-wide cycle sweep
//!
//! Runs the chain explorer from every wallet that can possibly sit on a
//! loop and keeps only the cycles. Wallets outside any non-trivial
//! strongly connected component are skipped up front.

use petgraph::algo::tarjan_scc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use super::chain_explorer::{sort_chains, ChainExplorer, SuspiciousChain};
use crate::cartographer::{Address, TransactionGraph};

/// Limits for a cycle sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleScanOptions {
    /// Explorer depth per start wallet
    pub depth: usize,
    /// Most start wallets to sweep
    pub max_wallets: usize,
    /// Stop once this many distinct cycles are collected
    pub max_cycles: usize,
}

impl Default for CycleScanOptions {
    fn default() -> Self {
        Self {
            depth: 4,
            max_wallets: 50,
            max_cycles: 20,
        }
    }
}

/// Wallets on some directed cycle, busiest first.
pub fn cycle_candidates(graph: &TransactionGraph) -> Vec<Address> {
    let (digraph, _) = graph.to_petgraph();

    let mut candidates: Vec<Address> = Vec::new();
    for component in tarjan_scc(&digraph) {
        if component.len() > 1 {
            candidates.extend(component.iter().map(|&n| digraph[n].clone()));
        } else if let Some(&node) = component.first() {
            let wallet = &digraph[node];
            if graph.edges_from(wallet).iter().any(|e| &e.to == wallet) {
                candidates.push(wallet.clone());
            }
        }
    }

    candidates.sort_by(|a, b| {
        graph
            .out_degree(b)
            .cmp(&graph.out_degree(a))
            .then_with(|| a.cmp(b))
    });
    candidates
}

/// Rotation-invariant key for a closed cycle path.
///
/// `[B, C, A, B]` and `[A, B, C, A]` describe the same loop.
fn cycle_signature(path: &[Address]) -> String {
    let ring = &path[..path.len().saturating_sub(1)];
    let Some(pivot) = ring
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return String::new();
    };

    ring[pivot..]
        .iter()
        .chain(ring[..pivot].iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("-")
}

/// Collect distinct cycles across the whole graph.
pub fn scan_cycles(graph: &TransactionGraph, options: CycleScanOptions) -> Vec<SuspiciousChain> {
    info!(
        "Scanning for cycles (depth {}, up to {} wallets, max {} cycles)",
        options.depth, options.max_wallets, options.max_cycles
    );

    let candidates = cycle_candidates(graph);
    debug!("{} wallets lie on a cycle", candidates.len());

    let explorer = ChainExplorer::new(graph, options.depth);
    let mut seen: HashSet<String> = HashSet::new();
    let mut cycles: Vec<SuspiciousChain> = Vec::new();

    for wallet in candidates.iter().take(options.max_wallets) {
        if cycles.len() >= options.max_cycles {
            break;
        }

        let exploration = explorer.explore(wallet);
        for cycle in exploration.chains.into_iter().filter(SuspiciousChain::is_cycle) {
            if seen.insert(cycle_signature(&cycle.path)) {
                cycles.push(cycle);
            }
        }
    }

    sort_chains(&mut cycles);
    cycles.truncate(options.max_cycles);

    info!("Cycle scan finished: {} distinct cycles", cycles.len());
    cycles
}
