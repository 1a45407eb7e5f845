//! Synthetic Transfer Graph Generator
//!
//! Run with: cargo run --bin generate-graph -- <wallets> <transfers> [out.json] [--no-cycle]
//!
//! Writes a random transfer list in the format `chain-sleuth` loads. Unless
//! `--no-cycle` is given, one planted cycle guarantees the cycle sweep has
//! something to find.

use rand::Rng;
use std::env;
use std::fs;

use chain_sleuth::Transfer;

fn wallet(i: usize) -> String {
    format!("wallet{:04}", i)
}

/// Random transfers between `wallets` wallets, plus the planted loop
/// wallet0000 → wallet0001 → wallet0002 → wallet0000 when asked.
fn generate<R: Rng>(rng: &mut R, wallets: usize, transfers: usize, plant_cycle: bool) -> Vec<Transfer> {
    let base_ts: i64 = 1_700_000_000;
    let mut records = Vec::with_capacity(transfers + 3);

    for i in 0..transfers {
        let from = rng.gen_range(0..wallets);
        let mut to = rng.gen_range(0..wallets);
        if to == from {
            to = (to + 1) % wallets;
        }
        records.push(Transfer {
            from: wallet(from),
            to: wallet(to),
            amount: (rng.gen_range(0.01..50.0_f64) * 1e4).round() / 1e4,
            cost: (rng.gen_range(0.0001..2.0_f64) * 1e4).round() / 1e4,
            tx_id: format!("tx{:06}", i),
            timestamp: base_ts + rng.gen_range(0..86_400 * 30),
        });
    }

    if plant_cycle {
        for (i, (from, to)) in [(0, 1), (1, 2), (2, 0)].into_iter().enumerate() {
            records.push(Transfer {
                from: wallet(from),
                to: wallet(to),
                amount: 10.0,
                cost: 0.5,
                tx_id: format!("planted{}", i),
                timestamp: base_ts + i as i64 * 600,
            });
        }
    }

    records
}

fn main() {
    let (flags, args): (Vec<String>, Vec<String>) =
        env::args().skip(1).partition(|a| a.starts_with("--"));
    let plant_cycle = !flags.iter().any(|f| f == "--no-cycle");
    let wallets: usize = args.first().and_then(|s| s.parse().ok()).unwrap_or(50).max(3);
    let transfers: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(200);
    let out = args.get(2).cloned().unwrap_or_else(|| "transfers.json".to_string());

    let records = generate(&mut rand::thread_rng(), wallets, transfers, plant_cycle);

    let json = match serde_json::to_string_pretty(&records) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("❌ Failed to serialize transfers: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = fs::write(&out, json) {
        eprintln!("❌ Failed to write {}: {}", out, e);
        std::process::exit(1);
    }

    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          CHAIN SLEUTH GRAPH GENERATOR                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("   Wallets:   {}", wallets);
    if plant_cycle {
        println!("   Transfers: {} (+3 planted cycle)", transfers);
    } else {
        println!("   Transfers: {}", transfers);
    }
    println!("   Output:    {}", out);
    println!();
    println!("📝 TRY IT:");
    println!();
    println!("   cargo run -- cycles --graph {}", out);
    println!("   cargo run -- chains --graph {} --start {}", out, wallet(0));
    println!("   cargo run -- path --graph {} --source {} --target {}", out, wallet(0), wallet(2));
    println!();
}
