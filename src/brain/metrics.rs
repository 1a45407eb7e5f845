//! Search Metrics
//!
//! Counters shared by the chain explorer and the optimal path search.
//! Each search owns its own instance; nothing here is global.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the optimal path search discarded a popped node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruneReason {
    /// Wallet already expanded at an equal or lower cost
    Dominated,
    /// Accumulated cost exceeds the ceiling
    OverBudget,
    /// Lower bound cannot beat the incumbent
    CannotImprove,
    /// Path hit the exploration length cap
    DepthCap,
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::Dominated => write!(f, "dominated"),
            PruneReason::OverBudget => write!(f, "over budget"),
            PruneReason::CannotImprove => write!(f, "cannot improve"),
            PruneReason::DepthCap => write!(f, "depth cap"),
        }
    }
}

/// Exploration counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Recursive calls made by the chain explorer
    pub paths_explored: u64,
    /// Nodes popped from the priority queue
    pub nodes_explored: u64,
    pub backtrack_count: u64,
    /// Every cycle closure seen, emitted or not
    pub cycles_detected: u64,
    pub branches_created: u64,
    pub branches_pruned: u64,

    pub pruned_dominated: u64,
    pub pruned_over_budget: u64,
    pub pruned_cannot_improve: u64,
    pub pruned_depth_cap: u64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prune(&mut self, reason: PruneReason) {
        self.branches_pruned += 1;
        match reason {
            PruneReason::Dominated => self.pruned_dominated += 1,
            PruneReason::OverBudget => self.pruned_over_budget += 1,
            PruneReason::CannotImprove => self.pruned_cannot_improve += 1,
            PruneReason::DepthCap => self.pruned_depth_cap += 1,
        }
    }

    pub fn pruned_for(&self, reason: PruneReason) -> u64 {
        match reason {
            PruneReason::Dominated => self.pruned_dominated,
            PruneReason::OverBudget => self.pruned_over_budget,
            PruneReason::CannotImprove => self.pruned_cannot_improve,
            PruneReason::DepthCap => self.pruned_depth_cap,
        }
    }

    /// Pruned branches per created branch; 0 when nothing was created.
    pub fn pruning_ratio(&self) -> f64 {
        if self.branches_created == 0 {
            return 0.0;
        }
        self.branches_pruned as f64 / self.branches_created as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_prune_tracks_total_and_reason() {
        let mut metrics = SearchMetrics::new();
        metrics.record_prune(PruneReason::Dominated);
        metrics.record_prune(PruneReason::CannotImprove);
        metrics.record_prune(PruneReason::CannotImprove);

        assert_eq!(metrics.branches_pruned, 3);
        assert_eq!(metrics.pruned_for(PruneReason::Dominated), 1);
        assert_eq!(metrics.pruned_for(PruneReason::CannotImprove), 2);
        assert_eq!(metrics.pruned_for(PruneReason::DepthCap), 0);
    }

    #[test]
    fn test_pruning_ratio() {
        let mut metrics = SearchMetrics::new();
        assert_eq!(metrics.pruning_ratio(), 0.0);

        metrics.branches_created = 4;
        metrics.record_prune(PruneReason::OverBudget);
        assert_eq!(metrics.pruning_ratio(), 0.25);
    }
}
