//! Optimal Path Search - Branch & Bound Edition
//!
//! Step 2.2: The Pathfinder
//!
//! Best-first search for the cheapest simple path between two wallets whose
//! accumulated fees stay under a hard ceiling.
//!
//! Pruning order (each hit bumps `branches_pruned`):
//! 1. wallet already expanded at an equal or lower cost
//! 2. cost over the ceiling
//! 3. cost + heuristic cannot beat the incumbent
//! 4. path longer than the exploration cap
//!
//! With the default zero heuristic this is uniform-cost search with a
//! ceiling and a length cap.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{PruneReason, SearchMetrics};
use crate::cartographer::{Address, TransactionGraph};

/// Nodes whose path already holds more wallets than this are not expanded
pub const MAX_SEARCH_PATH_LEN: usize = 15;

// ============================================
// HEURISTICS
// ============================================

/// Estimate of the remaining cost from `current` to `target`.
///
/// Must never overestimate, or the returned path may not be the cheapest.
pub trait Heuristic {
    fn estimate(&self, current: &str, target: &str) -> f64;
}

/// Constant zero estimate; turns the search into uniform-cost search
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _current: &str, _target: &str) -> f64 {
        0.0
    }
}

impl<F> Heuristic for F
where
    F: Fn(&str, &str) -> f64,
{
    fn estimate(&self, current: &str, target: &str) -> f64 {
        self(current, target)
    }
}

// ============================================
// RESULT TYPES
// ============================================

/// Outcome of one cost-bounded search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalPathResult {
    pub source: Address,
    pub target: Address,
    /// Empty when no path was found
    pub path: Vec<Address>,
    /// `+∞` when no path was found
    pub total_cost: f64,
    /// Hops, not wallets
    pub path_length: usize,
    pub path_found: bool,
    pub nodes_explored: u64,
    pub branches_pruned: u64,
    pub branches_created: u64,
    pub execution_time_ms: u64,
    pub metrics: SearchMetrics,
}

/// One hop of a found path, resolved against the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub from: Address,
    pub to: Address,
    pub amount: f64,
    pub cost: f64,
    pub tx_id: String,
    pub timestamp: i64,
    pub hop_index: usize,
}

impl OptimalPathResult {
    fn not_found(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            path: Vec::new(),
            total_cost: f64::INFINITY,
            path_length: 0,
            path_found: false,
            nodes_explored: 0,
            branches_pruned: 0,
            branches_created: 0,
            execution_time_ms: 0,
            metrics: SearchMetrics::new(),
        }
    }

    fn found(source: &str, target: &str, path: Vec<Address>, total_cost: f64) -> Self {
        Self {
            path_length: path.len().saturating_sub(1),
            path,
            total_cost,
            path_found: true,
            ..Self::not_found(source, target)
        }
    }

    fn with_metrics(mut self, metrics: SearchMetrics, execution_time_ms: u64) -> Self {
        self.nodes_explored = metrics.nodes_explored;
        self.branches_pruned = metrics.branches_pruned;
        self.branches_created = metrics.branches_created;
        self.execution_time_ms = execution_time_ms;
        self.metrics = metrics;
        self
    }

    pub fn format_path(&self) -> String {
        self.path.join(" → ")
    }

    /// Per-hop records for the found path.
    ///
    /// Each hop uses the first edge in the sender's adjacency list that
    /// reaches the next wallet, which is not necessarily the cheapest one.
    pub fn path_details(&self, graph: &TransactionGraph) -> Vec<PathStep> {
        if !self.path_found || self.path.len() < 2 {
            return Vec::new();
        }

        self.path
            .windows(2)
            .enumerate()
            .filter_map(|(hop_index, pair)| {
                let edge = graph.first_edge(&pair[0], &pair[1])?;
                Some(PathStep {
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                    amount: edge.amount,
                    cost: edge.cost,
                    tx_id: edge.tx_id.clone(),
                    timestamp: edge.timestamp,
                    hop_index,
                })
            })
            .collect()
    }
}

/// Result of one run in a multi-ceiling sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingResult {
    pub max_cost: f64,
    pub result: OptimalPathResult,
}

// ============================================
// PRIORITY QUEUE
// ============================================

#[derive(Debug, Clone)]
struct SearchNode {
    wallet: Address,
    path_so_far: Vec<Address>,
    cost_so_far: f64,
    heuristic: f64,
}

impl SearchNode {
    fn estimate(&self) -> f64 {
        self.cost_so_far + self.heuristic
    }
}

/// Heap entry; lowest estimate first, then earliest pushed
#[derive(Debug)]
struct Queued {
    seq: u64,
    node: SearchNode,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both keys are reversed
        other
            .node
            .estimate()
            .total_cmp(&self.node.estimate())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

// ============================================
// SEARCH
// ============================================

/// Branch-and-bound search over a read-only transaction graph
pub struct OptimalPathSearch<'a, H: Heuristic = ZeroHeuristic> {
    graph: &'a TransactionGraph,
    heuristic: H,
}

impl<'a> OptimalPathSearch<'a, ZeroHeuristic> {
    pub fn new(graph: &'a TransactionGraph) -> Self {
        Self {
            graph,
            heuristic: ZeroHeuristic,
        }
    }
}

impl<'a, H: Heuristic> OptimalPathSearch<'a, H> {
    pub fn with_heuristic(graph: &'a TransactionGraph, heuristic: H) -> Self {
        Self { graph, heuristic }
    }

    /// Cheapest simple path from `source` to `target` costing at most `max_cost`.
    pub fn find_optimal_path(&self, source: &str, target: &str, max_cost: f64) -> OptimalPathResult {
        let started = Instant::now();
        info!(
            "Starting branch & bound from {} to {} with max cost {}",
            source, target, max_cost
        );

        if source == target && max_cost >= 0.0 {
            debug!("Source equals target, nothing to explore");
            return OptimalPathResult::found(source, target, vec![source.to_string()], 0.0)
                .with_metrics(SearchMetrics::new(), started.elapsed().as_millis() as u64);
        }

        let mut metrics = SearchMetrics::new();
        let mut queue: BinaryHeap<Queued> = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut best: HashMap<Address, f64> = HashMap::new();
        let mut incumbent = OptimalPathResult::not_found(source, target);

        queue.push(Queued {
            seq,
            node: SearchNode {
                wallet: source.to_string(),
                path_so_far: vec![source.to_string()],
                cost_so_far: 0.0,
                heuristic: self.heuristic.estimate(source, target),
            },
        });

        while let Some(Queued { node, .. }) = queue.pop() {
            metrics.nodes_explored += 1;

            if node.wallet == target {
                if node.cost_so_far <= max_cost && node.cost_so_far < incumbent.total_cost {
                    info!(
                        "New best path: cost {} over {} hops",
                        node.cost_so_far,
                        node.path_so_far.len() - 1
                    );
                    incumbent = OptimalPathResult::found(source, target, node.path_so_far, node.cost_so_far);
                }
                continue;
            }

            if let Some(reason) = prune_reason(&node, &best, max_cost, incumbent.total_cost) {
                debug!("Pruned {} at cost {}: {}", node.wallet, node.cost_so_far, reason);
                metrics.record_prune(reason);
                continue;
            }

            best.insert(node.wallet.clone(), node.cost_so_far);

            for edge in self.graph.edges_from(&node.wallet) {
                // Paths stay simple
                if node.path_so_far.contains(&edge.to) {
                    continue;
                }

                let mut path_so_far = node.path_so_far.clone();
                path_so_far.push(edge.to.clone());

                seq += 1;
                queue.push(Queued {
                    seq,
                    node: SearchNode {
                        wallet: edge.to.clone(),
                        path_so_far,
                        cost_so_far: node.cost_so_far + edge.cost,
                        heuristic: self.heuristic.estimate(&edge.to, target),
                    },
                });
                metrics.branches_created += 1;
            }
        }

        let execution_time_ms = started.elapsed().as_millis() as u64;
        info!("Branch & bound finished in {}ms", execution_time_ms);
        info!(
            "  {} nodes explored, {} branches created, {} branches pruned",
            metrics.nodes_explored, metrics.branches_created, metrics.branches_pruned
        );

        if incumbent.path_found {
            info!(
                "Optimal path found: {} hops, total cost {}",
                incumbent.path_length, incumbent.total_cost
            );
        } else {
            warn!("No path from {} to {} with cost <= {}", source, target, max_cost);
        }

        incumbent.with_metrics(metrics, execution_time_ms)
    }

    /// Cheapest path with no cost ceiling.
    pub fn find_cheapest_path(&self, source: &str, target: &str) -> OptimalPathResult {
        self.find_optimal_path(source, target, f64::INFINITY)
    }

    /// Run the search once per ceiling, in the given order.
    ///
    /// Stops after the first ceiling that yields a path strictly cheaper
    /// than itself; any larger ceiling would return the same path.
    pub fn find_across_ceilings(&self, source: &str, target: &str, ceilings: &[f64]) -> Vec<CeilingResult> {
        let mut results = Vec::with_capacity(ceilings.len());

        for &max_cost in ceilings {
            let result = self.find_optimal_path(source, target, max_cost);
            let settled = result.path_found && result.total_cost < max_cost;
            results.push(CeilingResult { max_cost, result });

            if settled {
                break;
            }
        }

        results
    }
}

fn prune_reason(
    node: &SearchNode,
    best: &HashMap<Address, f64>,
    max_cost: f64,
    incumbent_cost: f64,
) -> Option<PruneReason> {
    if best.get(&node.wallet).is_some_and(|&seen| seen <= node.cost_so_far) {
        return Some(PruneReason::Dominated);
    }
    if node.cost_so_far > max_cost {
        return Some(PruneReason::OverBudget);
    }
    if node.estimate() >= incumbent_cost {
        return Some(PruneReason::CannotImprove);
    }
    if node.path_so_far.len() > MAX_SEARCH_PATH_LEN {
        return Some(PruneReason::DepthCap);
    }
    None
}

/// Cheapest path from `source` to `target` under `max_cost`, zero heuristic.
pub fn find_optimal_path(
    graph: &TransactionGraph,
    source: &str,
    target: &str,
    max_cost: f64,
) -> OptimalPathResult {
    OptimalPathSearch::new(graph).find_optimal_path(source, target, max_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::Edge;

    fn graph_of(edges: &[(&str, &str, f64, f64)]) -> TransactionGraph {
        let mut graph = TransactionGraph::new();
        for (i, (from, to, amount, cost)) in edges.iter().enumerate() {
            graph
                .add_edge(*from, Edge::new(*to, *amount, *cost, format!("tx{}", i), 1_700_000_000 + i as i64))
                .unwrap();
        }
        graph
    }

    fn diamond() -> TransactionGraph {
        graph_of(&[
            ("A", "B", 50.0, 20.0),
            ("A", "C", 20.0, 5.0),
            ("B", "D", 30.0, 10.0),
            ("C", "D", 40.0, 8.0),
        ])
    }

    fn path(wallets: &[&str]) -> Vec<Address> {
        wallets.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_finds_cheapest_route() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "D", 100.0);

        assert!(result.path_found);
        assert_eq!(result.path, path(&["A", "C", "D"]));
        assert_eq!(result.total_cost, 13.0);
        assert_eq!(result.path_length, 2);
        assert_eq!(result.source, "A");
        assert_eq!(result.target, "D");
        assert_eq!(result.nodes_explored, 4);
        assert_eq!(result.branches_created, 3);
        assert_eq!(result.branches_pruned, 1);
        assert_eq!(result.metrics.pruned_for(PruneReason::CannotImprove), 1);
    }

    #[test]
    fn test_ceiling_excludes_expensive_paths() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "D", 10.0);

        assert!(!result.path_found);
        assert!(result.path.is_empty());
        assert!(result.nodes_explored > 0);
        assert!(result.metrics.pruned_for(PruneReason::OverBudget) > 0);
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "D", 13.0);
        assert!(result.path_found);
        assert_eq!(result.total_cost, 13.0);
    }

    #[test]
    fn test_source_equals_target() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "A", 100.0);

        assert!(result.path_found);
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.path, path(&["A"]));
        assert_eq!(result.path_length, 0);
        assert_eq!(result.nodes_explored, 0);
    }

    #[test]
    fn test_source_equals_target_with_negative_ceiling() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "A", -1.0);
        assert!(!result.path_found);
    }

    #[test]
    fn test_disconnected_target() {
        let graph = graph_of(&[("A", "B", 1.0, 1.0), ("X", "Y", 1.0, 1.0)]);
        let result = find_optimal_path(&graph, "A", "Y", 100.0);

        assert!(!result.path_found);
        assert!(result.path.is_empty());
        assert_eq!(result.total_cost, f64::INFINITY);
        assert_eq!(result.nodes_explored, 2);
    }

    #[test]
    fn test_empty_graph() {
        let graph = TransactionGraph::new();
        let result = find_optimal_path(&graph, "A", "B", 100.0);
        assert!(!result.path_found);
        assert_eq!(result.nodes_explored, 1);
    }

    #[test]
    fn test_negative_ceiling_finds_nothing() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "D", -5.0);

        assert!(!result.path_found);
        assert_eq!(result.nodes_explored, 1);
        assert_eq!(result.metrics.pruned_for(PruneReason::OverBudget), 1);
    }

    #[test]
    fn test_ties_follow_adjacency_order() {
        let graph = graph_of(&[
            ("A", "B", 1.0, 1.0),
            ("A", "C", 1.0, 1.0),
            ("B", "D", 1.0, 1.0),
            ("C", "D", 1.0, 1.0),
        ]);
        let result = find_optimal_path(&graph, "A", "D", 10.0);
        assert_eq!(result.path, path(&["A", "B", "D"]));

        let again = find_optimal_path(&graph, "A", "D", 10.0);
        assert_eq!(again.path, result.path);
    }

    #[test]
    fn test_prefers_cheaper_longer_route() {
        let graph = graph_of(&[
            ("A", "D", 1.0, 50.0),
            ("A", "B", 1.0, 1.0),
            ("B", "C", 1.0, 1.0),
            ("C", "D", 1.0, 1.0),
        ]);
        let result = find_optimal_path(&graph, "A", "D", 100.0);
        assert_eq!(result.path, path(&["A", "B", "C", "D"]));
        assert_eq!(result.total_cost, 3.0);
    }

    #[test]
    fn test_length_cap_stops_long_paths() {
        let names: Vec<String> = (0..20).map(|i| format!("w{:02}", i)).collect();
        let mut graph = TransactionGraph::new();
        for pair in names.windows(2) {
            graph.add_edge(pair[0].clone(), Edge::new(pair[1].clone(), 1.0, 1.0, "tx", 0)).unwrap();
        }

        let result = find_optimal_path(&graph, "w00", "w19", 1_000.0);
        assert!(!result.path_found);
        assert_eq!(result.metrics.pruned_for(PruneReason::DepthCap), 1);
    }

    #[test]
    fn test_custom_heuristic_keeps_optimum() {
        let graph = diamond();
        // Every remaining hop costs at least 8 here, so 1.0 never overestimates
        let heuristic = |current: &str, target: &str| if current == target { 0.0 } else { 1.0 };
        let result = OptimalPathSearch::with_heuristic(&graph, heuristic).find_optimal_path("A", "D", 100.0);

        assert!(result.path_found);
        assert_eq!(result.total_cost, 13.0);
        assert_eq!(result.path, path(&["A", "C", "D"]));
    }

    #[test]
    fn test_cheapest_path_has_no_ceiling() {
        let graph = diamond();
        let result = OptimalPathSearch::new(&graph).find_cheapest_path("A", "D");
        assert_eq!(result.total_cost, 13.0);
    }

    #[test]
    fn test_ceiling_sweep_stops_once_settled() {
        let graph = diamond();
        let results = OptimalPathSearch::new(&graph).find_across_ceilings("A", "D", &[10.0, 13.0, 50.0, 100.0]);

        assert_eq!(results.len(), 3);
        assert!(!results[0].result.path_found);
        assert!(results[1].result.path_found);
        assert_eq!(results[2].max_cost, 50.0);
        assert_eq!(results[2].result.total_cost, 13.0);
    }

    #[test]
    fn test_path_details() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "A", "D", 100.0);
        let steps = result.path_details(&graph);

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].from, "A");
        assert_eq!(steps[0].to, "C");
        assert_eq!(steps[0].cost, 5.0);
        assert_eq!(steps[0].tx_id, "tx1");
        assert_eq!(steps[1].hop_index, 1);
        assert_eq!(steps[1].amount, 40.0);
    }

    #[test]
    fn test_path_details_empty_when_not_found() {
        let graph = diamond();
        let result = find_optimal_path(&graph, "D", "A", 100.0);
        assert!(result.path_details(&graph).is_empty());
    }
}
