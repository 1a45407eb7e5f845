//! Console Report
//!
//! Human-readable rendering of search results. JSON output lives in the
//! CLI; this module only prints.

use chrono::DateTime;
use console::style;

use crate::brain::{
    CeilingResult, ChainExploration, ChainKind, OptimalPathResult, PruneReason, SearchMetrics,
    SuspiciousChain,
};
use crate::cartographer::TransactionGraph;

pub fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔎 CHAIN SLEUTH - Transaction Graph Forensics").cyan().bold()
    );
    println!(
        "{}",
        style("    Backtracking Chains | Branch & Bound Paths").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

/// Render a unix timestamp; raw seconds when out of range.
pub fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// `∞` for an unset cost
pub fn format_cost(cost: f64) -> String {
    if cost.is_finite() {
        format!("{:.4}", cost)
    } else {
        "∞".to_string()
    }
}

fn kind_label(kind: ChainKind) -> console::StyledObject<String> {
    let label = kind.to_string();
    match kind {
        ChainKind::Cycle => style(label).red().bold(),
        ChainKind::PeelChain => style(label).magenta(),
        ChainKind::RapidRedistribution => style(label).yellow(),
        ChainKind::LinearChain | ChainKind::MixingPattern => style(label).blue(),
    }
}

fn print_chain_line(index: usize, chain: &SuspiciousChain) {
    println!(
        "  {}. {} | suspicion {:.2} | {} hops | amount {:.4}",
        index + 1,
        kind_label(chain.kind),
        chain.suspicion_level,
        chain.hop_count(),
        chain.total_amount
    );
    println!("     Path: {}", style(chain.format_path()).cyan());
    println!("     {}", style(&chain.description).dim());
}

fn print_metrics(metrics: &SearchMetrics) {
    println!(
        "  Metrics: {} paths | {} nodes | {} backtracks | {} cycles | {} created | {} pruned",
        metrics.paths_explored,
        metrics.nodes_explored,
        metrics.backtrack_count,
        metrics.cycles_detected,
        metrics.branches_created,
        metrics.branches_pruned
    );
    if metrics.branches_pruned > 0 {
        let reasons = [
            PruneReason::Dominated,
            PruneReason::OverBudget,
            PruneReason::CannotImprove,
            PruneReason::DepthCap,
        ]
        .iter()
        .filter(|r| metrics.pruned_for(**r) > 0)
        .map(|r| format!("{} {}", metrics.pruned_for(*r), r))
        .collect::<Vec<_>>()
        .join(", ");
        println!("  Pruned: {} (ratio {:.2})", reasons, metrics.pruning_ratio());
    }
}

pub fn print_exploration(exploration: &ChainExploration, top: usize) {
    println!();
    println!(
        "{}",
        style(format!(
            "═══ SUSPICIOUS CHAINS FROM {} (depth {}) ═══",
            exploration.start, exploration.max_depth
        ))
        .yellow()
        .bold()
    );
    println!();

    if exploration.chains.is_empty() {
        println!("  {}", style("No suspicious chains found").green());
    } else {
        let cycle_count = exploration.cycles().count();
        println!(
            "Found {} chains: {} cycles, {} other",
            exploration.chains.len(),
            cycle_count,
            exploration.chains.len() - cycle_count
        );
        println!();
        for (i, chain) in exploration.chains.iter().take(top).enumerate() {
            print_chain_line(i, chain);
            println!();
        }
        if exploration.chains.len() > top {
            println!("  ... and {} more chains", exploration.chains.len() - top);
        }
    }

    println!();
    print_metrics(&exploration.metrics);
    println!("  Time: {}ms", exploration.execution_time_ms);
}

pub fn print_cycles(cycles: &[SuspiciousChain], top: usize) {
    println!();
    println!("{}", style("═══ CYCLE SWEEP ═══").red().bold());
    println!();

    if cycles.is_empty() {
        println!("  {}", style("No cycles found").green());
        return;
    }

    for (i, cycle) in cycles.iter().take(top).enumerate() {
        print_chain_line(i, cycle);
        println!();
    }
    if cycles.len() > top {
        println!("  ... and {} more cycles", cycles.len() - top);
    }
}

pub fn print_path(result: &OptimalPathResult, graph: &TransactionGraph) {
    println!();
    println!(
        "{}",
        style(format!(
            "═══ OPTIMAL PATH {} → {} ═══",
            result.source, result.target
        ))
        .blue()
        .bold()
    );
    println!();

    if !result.path_found {
        println!("  {}", style("✗ No path within the cost ceiling").red());
    } else {
        println!(
            "  {} | {} hops | total cost {}",
            style("✓ PATH FOUND").green(),
            result.path_length,
            format_cost(result.total_cost)
        );
        println!("  Path: {}", style(result.format_path()).cyan());
        println!();

        for step in result.path_details(graph) {
            println!(
                "    #{} {} → {} | amount {:.4} | cost {:.4} | tx {} | {}",
                step.hop_index,
                step.from,
                step.to,
                step.amount,
                step.cost,
                step.tx_id,
                format_timestamp(step.timestamp)
            );
        }
    }

    println!();
    print_metrics(&result.metrics);
    println!("  Time: {}ms", result.execution_time_ms);
}

pub fn print_ceilings(results: &[CeilingResult]) {
    println!();
    println!("{}", style("═══ COST CEILING SCENARIOS ═══").blue().bold());
    println!();

    for scenario in results {
        let result = &scenario.result;
        let status = if result.path_found {
            style(format!("✓ cost {}", format_cost(result.total_cost))).green()
        } else {
            style("✗ not found".to_string()).red()
        };
        println!(
            "  max cost {:>10} | {} | {} nodes, {} pruned",
            scenario.max_cost, status, result.nodes_explored, result.branches_pruned
        );
        if result.path_found {
            println!("     Path: {}", style(result.format_path()).cyan());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(13.0), "13.0000");
        assert_eq!(format_cost(f64::INFINITY), "∞");
    }
}
