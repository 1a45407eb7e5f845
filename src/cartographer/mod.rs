//! Phase 1: The Cartographer (Graph View)
//!
//! Turns raw transfer records into the adjacency list the brain searches.

mod graph;

pub use graph::{Address, Edge, GraphError, TransactionGraph, Transfer};
