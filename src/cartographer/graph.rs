//! Transaction Graph - Adjacency List Edition
//!
//! The Map Maker for wallet flows.
//!
//! Wallets are nodes, transfers are directed edges. The search engine only
//! ever reads this view; building and bounding it happens here, before the
//! brain gets involved.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Wallet identifier. Opaque, only required to be non-empty.
pub type Address = String;

/// Errors raised while turning raw transfer data into a graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to read graph file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse transfer list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Wallet address must not be empty")]
    EmptyAddress,
}

/// Directed edge leaving a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub to: Address,
    /// Value transferred
    pub amount: f64,
    /// Fee paid; only the optimal path search reads it
    #[serde(default)]
    pub cost: f64,
    pub tx_id: String,
    pub timestamp: i64,
}

impl Edge {
    pub fn new(to: impl Into<Address>, amount: f64, cost: f64, tx_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            to: to.into(),
            amount,
            cost,
            tx_id: tx_id.into(),
            timestamp,
        }
    }
}

/// A single transfer record as it arrives from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Transfer {
    fn is_valid(&self) -> bool {
        !self.from.is_empty()
            && !self.to.is_empty()
            && self.amount.is_finite()
            && self.amount >= 0.0
            && self.cost.is_finite()
            && self.cost >= 0.0
    }

    fn to_edge(&self) -> Edge {
        Edge::new(self.to.clone(), self.amount, self.cost, self.tx_id.clone(), self.timestamp)
    }
}

/// Adjacency-list view of the transaction graph.
///
/// Edge order per wallet is insertion order and is what every search uses
/// to break ties, so nothing here ever reorders an adjacency list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionGraph {
    adjacency: HashMap<Address, Vec<Edge>>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
        }
    }

    /// Build a graph from raw transfers, skipping malformed records.
    pub fn from_transfers(transfers: &[Transfer]) -> Self {
        let mut graph = Self::new();
        let mut skipped_invalid = 0;

        for transfer in transfers {
            if !transfer.is_valid() {
                debug!("Skipping malformed transfer {:?}", transfer.tx_id);
                skipped_invalid += 1;
                continue;
            }
            graph.push_edge(transfer.from.clone(), transfer.to_edge());
        }

        info!(
            "Graph built: {} Wallets, {} Edges",
            graph.wallet_count(),
            graph.edge_count()
        );

        if skipped_invalid > 0 {
            warn!("  Skipped {} malformed transfers", skipped_invalid);
        }

        graph
    }

    /// Load a JSON array of [`Transfer`] records.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let content = fs::read_to_string(path)?;
        let transfers: Vec<Transfer> = serde_json::from_str(&content)?;
        Ok(Self::from_transfers(&transfers))
    }

    /// Append an edge to `from`'s adjacency list.
    pub fn add_edge(&mut self, from: impl Into<Address>, edge: Edge) -> Result<(), GraphError> {
        let from = from.into();
        if from.is_empty() || edge.to.is_empty() {
            return Err(GraphError::EmptyAddress);
        }
        self.push_edge(from, edge);
        Ok(())
    }

    fn push_edge(&mut self, from: Address, edge: Edge) {
        self.adjacency.entry(from).or_default().push(edge);
    }

    /// Outgoing edges in insertion order; empty for unknown wallets.
    pub fn edges_from(&self, wallet: &str) -> &[Edge] {
        self.adjacency.get(wallet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First edge `from -> to` in adjacency order.
    pub fn first_edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges_from(from).iter().find(|e| e.to == to)
    }

    /// Sum of first-matching edge amounts along consecutive pairs of `path`.
    pub fn path_amount(&self, path: &[Address]) -> f64 {
        path.windows(2)
            .filter_map(|pair| self.first_edge(&pair[0], &pair[1]))
            .map(|e| e.amount)
            .sum()
    }

    pub fn out_degree(&self, wallet: &str) -> usize {
        self.edges_from(wallet).len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.values().all(Vec::is_empty)
    }

    /// Wallets appearing as source or destination of any edge, sorted.
    pub fn wallets(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (from, edges) in &self.adjacency {
            seen.insert(from.as_str());
            for edge in edges {
                seen.insert(edge.to.as_str());
            }
        }
        let mut wallets: Vec<&str> = seen.into_iter().collect();
        wallets.sort_unstable();
        wallets
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets().len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Bounded subgraph reachable from `start` within `max_hops` hops.
    ///
    /// Keeps every outgoing edge of each wallet reached in fewer than
    /// `max_hops` hops, so the subgraph is finite before any search runs.
    pub fn neighborhood(&self, start: &str, max_hops: usize) -> Self {
        let mut sub = Self::new();
        let mut depth_of: HashMap<&str, usize> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        depth_of.insert(start, 0);
        queue.push_back(start);

        while let Some(wallet) = queue.pop_front() {
            let depth = depth_of[wallet];
            if depth >= max_hops {
                continue;
            }
            for edge in self.edges_from(wallet) {
                sub.push_edge(wallet.to_string(), edge.clone());
                if !depth_of.contains_key(edge.to.as_str()) {
                    depth_of.insert(edge.to.as_str(), depth + 1);
                    queue.push_back(edge.to.as_str());
                }
            }
        }

        debug!(
            "Neighborhood of {} ({} hops): {} wallets, {} edges",
            start,
            max_hops,
            sub.wallet_count(),
            sub.edge_count()
        );

        sub
    }

    /// Copy of this graph where every transfer is also traversable backwards.
    ///
    /// Reverse edges are appended after all forward edges of a wallet,
    /// walking sources in sorted order to stay deterministic.
    pub fn with_reverse_edges(&self) -> Self {
        let mut both = self.clone();
        let mut sources: Vec<&Address> = self.adjacency.keys().collect();
        sources.sort();

        for from in sources {
            for edge in &self.adjacency[from] {
                let reverse = Edge::new(from.clone(), edge.amount, edge.cost, edge.tx_id.clone(), edge.timestamp);
                both.push_edge(edge.to.clone(), reverse);
            }
        }
        both
    }

    /// Project into a petgraph `DiGraph` for structural analysis.
    pub fn to_petgraph(&self) -> (DiGraph<Address, f64>, HashMap<Address, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut wallet_to_node: HashMap<Address, NodeIndex> = HashMap::new();

        for wallet in self.wallets() {
            let node = graph.add_node(wallet.to_string());
            wallet_to_node.insert(wallet.to_string(), node);
        }

        let mut sources: Vec<&Address> = self.adjacency.keys().collect();
        sources.sort();
        for from in sources {
            for edge in &self.adjacency[from] {
                graph.add_edge(wallet_to_node[from], wallet_to_node[&edge.to], edge.amount);
            }
        }

        (graph, wallet_to_node)
    }
}
