//! Diagnostic tool - Check effective configuration
//!
//! Run with: cargo run --bin diagnose

use chain_sleuth::config::Config;
use std::env;

fn main() {
    println!("🔍 CHAIN SLEUTH DIAGNOSTIC CHECK\n");

    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                  ENVIRONMENT                       ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("SLEUTH_MAX_DEPTH", "5", "Chain explorer recursion depth"),
        ("SLEUTH_NEIGHBORHOOD_HOPS", "0", "Hops kept around the start wallet (0 = depth + 2)"),
        ("SLEUTH_MAX_COST", "100.0", "Fee ceiling for path queries"),
        ("SLEUTH_COST_CEILINGS", "50,100,200,500,1000", "Scenario sweep ceilings"),
        ("SLEUTH_MAX_CYCLES", "20", "Cycles kept by the sweep"),
        ("SLEUTH_FINDINGS_LOG", "false", "Append findings as JSON lines?"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    println!("═══════════════════════════════════════════════════");
    println!("                   VALIDATION                       ");
    println!("═══════════════════════════════════════════════════\n");

    match Config::from_env() {
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!("  ✅ Configuration is valid\n");
                config.print_summary();
            }
            Err(e) => println!("  ❌ {}", e),
        },
        Err(e) => println!("  ❌ Failed to load configuration: {}", e),
    }

    println!("\n✅ Diagnostic complete!\n");
}
