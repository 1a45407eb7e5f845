//! Property-based tests for the search engine using proptest.
//!
//! Random small graphs, checked against invariants that must hold for any
//! input: bounded suspicion, well-formed cycles, cost ceilings respected,
//! monotone ceilings and repeatable results.

use proptest::prelude::*;

use chain_sleuth::brain::{find_optimal_path, find_suspicious_chains, ChainKind, MIN_CHAIN_LEN};
use chain_sleuth::cartographer::{Edge, TransactionGraph};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

const WALLETS: usize = 7;

fn wallet(i: usize) -> String {
    format!("w{}", i)
}

/// Edge list over a fixed small wallet set; parallel edges and self-loops allowed.
fn arb_graph() -> impl Strategy<Value = TransactionGraph> {
    prop::collection::vec((0..WALLETS, 0..WALLETS, 0.0..100.0f64, 0.0..20.0f64), 0..24).prop_map(
        |edges| {
            let mut graph = TransactionGraph::new();
            for (i, (from, to, amount, cost)) in edges.into_iter().enumerate() {
                graph
                    .add_edge(wallet(from), Edge::new(wallet(to), amount, cost, format!("tx{}", i), i as i64))
                    .expect("wallet names are never empty");
            }
            graph
        },
    )
}

// ---------------------------------------------------------------------------
// Chain explorer
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chains_are_well_formed(graph in arb_graph(), start in 0..WALLETS, depth in 0usize..6) {
        let chains = find_suspicious_chains(&graph, &wallet(start), depth);

        for chain in &chains {
            prop_assert!((0.0..=1.0).contains(&chain.suspicion_level));
            prop_assert!(chain.path.len() >= MIN_CHAIN_LEN);

            if chain.kind == ChainKind::Cycle {
                prop_assert_eq!(chain.path.first(), chain.path.last());
                prop_assert_eq!(chain.suspicion_level, 0.95);
                let ring = &chain.path[..chain.path.len() - 1];
                let mut unique = ring.to_vec();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), ring.len());
            } else {
                let mut unique = chain.path.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), chain.path.len());
            }
        }

        for pair in chains.windows(2) {
            prop_assert!(pair[0].suspicion_level >= pair[1].suspicion_level);
        }
    }

    #[test]
    fn chain_search_is_deterministic(graph in arb_graph(), start in 0..WALLETS) {
        let first = find_suspicious_chains(&graph, &wallet(start), 4);
        let second = find_suspicious_chains(&graph, &wallet(start), 4);
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Optimal path search
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn found_paths_respect_the_ceiling(
        graph in arb_graph(),
        source in 0..WALLETS,
        target in 0..WALLETS,
        max_cost in 0.0..60.0f64,
    ) {
        let result = find_optimal_path(&graph, &wallet(source), &wallet(target), max_cost);

        if result.path_found {
            prop_assert!(result.total_cost <= max_cost);
            prop_assert_eq!(result.path.first(), Some(&wallet(source)));
            prop_assert_eq!(result.path.last(), Some(&wallet(target)));
            prop_assert_eq!(result.path_length, result.path.len() - 1);
            prop_assert!(result.nodes_explored >= result.path_length as u64);

            let details = result.path_details(&graph);
            prop_assert_eq!(details.len(), result.path_length);
        } else {
            prop_assert!(result.path.is_empty());
        }
    }

    #[test]
    fn raising_the_ceiling_never_costs_more(
        graph in arb_graph(),
        source in 0..WALLETS,
        target in 0..WALLETS,
        low in 0.0..40.0f64,
        extra in 0.0..40.0f64,
    ) {
        let tight = find_optimal_path(&graph, &wallet(source), &wallet(target), low);
        let loose = find_optimal_path(&graph, &wallet(source), &wallet(target), low + extra);

        if tight.path_found {
            prop_assert!(loose.path_found);
            prop_assert!(loose.total_cost <= tight.total_cost);
        }
    }

    #[test]
    fn path_search_is_deterministic(graph in arb_graph(), source in 0..WALLETS, target in 0..WALLETS) {
        let first = find_optimal_path(&graph, &wallet(source), &wallet(target), 50.0);
        let second = find_optimal_path(&graph, &wallet(source), &wallet(target), 50.0);

        prop_assert_eq!(first.path, second.path);
        prop_assert_eq!(first.total_cost, second.total_cost);
        prop_assert_eq!(first.nodes_explored, second.nodes_explored);
    }
}

// ---------------------------------------------------------------------------
// Fixed scenarios
// ---------------------------------------------------------------------------

#[test]
fn triangle_yields_one_cycle_at_any_sufficient_depth() {
    let mut graph = TransactionGraph::new();
    for (from, to) in [("A", "B"), ("B", "C"), ("C", "A")] {
        graph.add_edge(from, Edge::new(to, 10.0, 0.0, "tx", 0)).unwrap();
    }

    for depth in 3..=6 {
        let chains = find_suspicious_chains(&graph, "A", depth);
        let cycles: Vec<_> = chains.iter().filter(|c| c.kind == ChainKind::Cycle).collect();

        assert_eq!(cycles.len(), 1, "depth {}", depth);
        assert_eq!(cycles[0].path, vec!["A", "B", "C", "A"]);
        assert_eq!(cycles[0].total_amount, 30.0);
    }
}

#[test]
fn end_to_end_cheapest_route() {
    let mut graph = TransactionGraph::new();
    graph.add_edge("A", Edge::new("B", 50.0, 20.0, "t1", 0)).unwrap();
    graph.add_edge("A", Edge::new("C", 20.0, 5.0, "t2", 0)).unwrap();
    graph.add_edge("B", Edge::new("D", 30.0, 10.0, "t3", 0)).unwrap();
    graph.add_edge("C", Edge::new("D", 40.0, 8.0, "t4", 0)).unwrap();

    let result = find_optimal_path(&graph, "A", "D", 100.0);

    assert!(result.path_found);
    assert_eq!(result.path, vec!["A", "C", "D"]);
    assert_eq!(result.total_cost, 13.0);
    assert_eq!(result.path_length, 2);
}
