//! Configuration for Chain Sleuth
//!
//! Search parameters plus the boundary policy the search core does not
//! enforce on its own (depth range, non-negative ceilings).

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::brain::CycleScanOptions;

/// Deepest chain exploration the CLI will accept
pub const MAX_ALLOWED_DEPTH: usize = 10;

// ============================================
// MAIN CONFIGURATION
// ============================================

/// Main configuration struct for Chain Sleuth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Chain Exploration ==========
    /// Recursion depth for the chain explorer (4-6 recommended)
    pub max_depth: usize,

    /// Hops around the start wallet kept before searching.
    /// 0 means `max_depth + 2`.
    pub neighborhood_hops: usize,

    // ========== Optimal Path ==========
    /// Fee ceiling for optimal path queries
    pub max_cost: f64,

    /// Ceilings tried by the scenario sweep, ascending
    pub cost_ceilings: Vec<f64>,

    /// Treat every transfer as traversable in both directions for path queries
    pub bidirectional_paths: bool,

    // ========== Cycle Sweep ==========
    pub max_cycles: usize,
    pub cycle_scan_depth: usize,
    pub cycle_scan_wallets: usize,

    // ========== Output ==========
    /// Chains shown in the console report
    pub report_top: usize,

    /// Append a JSON line per finding
    pub findings_log: bool,
    pub findings_log_path: String,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            max_depth: env_or("SLEUTH_MAX_DEPTH", defaults.max_depth),
            neighborhood_hops: env_or("SLEUTH_NEIGHBORHOOD_HOPS", defaults.neighborhood_hops),
            max_cost: env_or("SLEUTH_MAX_COST", defaults.max_cost),
            cost_ceilings: env::var("SLEUTH_COST_CEILINGS")
                .ok()
                .and_then(|s| parse_ceilings(&s))
                .unwrap_or(defaults.cost_ceilings),
            bidirectional_paths: env_or("SLEUTH_BIDIRECTIONAL_PATHS", defaults.bidirectional_paths),
            max_cycles: env_or("SLEUTH_MAX_CYCLES", defaults.max_cycles),
            cycle_scan_depth: env_or("SLEUTH_CYCLE_SCAN_DEPTH", defaults.cycle_scan_depth),
            cycle_scan_wallets: env_or("SLEUTH_CYCLE_SCAN_WALLETS", defaults.cycle_scan_wallets),
            report_top: env_or("SLEUTH_REPORT_TOP", defaults.report_top),
            findings_log: env_or("SLEUTH_FINDINGS_LOG", defaults.findings_log),
            findings_log_path: env::var("SLEUTH_FINDINGS_LOG_PATH").unwrap_or(defaults.findings_log_path),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Hops of neighborhood to cut around a start wallet
    pub fn effective_neighborhood_hops(&self) -> usize {
        if self.neighborhood_hops == 0 {
            self.max_depth + 2
        } else {
            self.neighborhood_hops
        }
    }

    pub fn cycle_scan_options(&self) -> CycleScanOptions {
        CycleScanOptions {
            depth: self.cycle_scan_depth,
            max_wallets: self.cycle_scan_wallets,
            max_cycles: self.max_cycles,
        }
    }

    /// Reject parameters the CLI should never pass to the search core
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_ALLOWED_DEPTH {
            return Err(eyre::eyre!(
                "max_depth must be between 1 and {} (currently {})",
                MAX_ALLOWED_DEPTH,
                self.max_depth
            ));
        }
        if self.cycle_scan_depth == 0 || self.cycle_scan_depth > MAX_ALLOWED_DEPTH {
            return Err(eyre::eyre!(
                "cycle_scan_depth must be between 1 and {} (currently {})",
                MAX_ALLOWED_DEPTH,
                self.cycle_scan_depth
            ));
        }
        if !self.max_cost.is_finite() || self.max_cost < 0.0 {
            return Err(eyre::eyre!(
                "max_cost must be a finite, non-negative number (currently {})",
                self.max_cost
            ));
        }
        if self.cost_ceilings.is_empty() {
            return Err(eyre::eyre!("cost_ceilings must not be empty"));
        }
        if self.cost_ceilings.iter().any(|c| c.is_nan() || *c < 0.0) {
            return Err(eyre::eyre!("cost_ceilings must all be non-negative"));
        }
        if self.cost_ceilings.windows(2).any(|w| w[0] > w[1]) {
            return Err(eyre::eyre!("cost_ceilings must be in ascending order"));
        }
        if self.max_cycles == 0 {
            return Err(eyre::eyre!("max_cycles must be at least 1"));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let ceilings = self
            .cost_ceilings
            .iter()
            .map(|c| format!("{}", c))
            .collect::<Vec<_>>()
            .join(", ");

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              CHAIN SLEUTH - CONFIGURATION                  ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CHAIN EXPLORATION                                          ║");
        println!("║ • Max Depth:       {:^40} ║", self.max_depth);
        println!("║ • Neighborhood:    {:^40} ║", format!("{} hops", self.effective_neighborhood_hops()));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ OPTIMAL PATH                                               ║");
        println!("║ • Max Cost:        {:^40} ║", self.max_cost);
        println!("║ • Ceilings:        {:^40} ║", ceilings);
        println!("║ • Bidirectional:   {:^40} ║",
            if self.bidirectional_paths { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CYCLE SWEEP                                                ║");
        println!("║ • Max Cycles:      {:^40} ║", self.max_cycles);
        println!("║ • Scan Depth:      {:^40} ║", self.cycle_scan_depth);
        println!("║ • Scan Wallets:    {:^40} ║", self.cycle_scan_wallets);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ OUTPUT                                                     ║");
        println!("║ • Report Top:      {:^40} ║", self.report_top);
        println!("║ • Findings Log:    {:^40} ║",
            if self.findings_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 5,
            neighborhood_hops: 0,
            max_cost: 100.0,
            cost_ceilings: vec![50.0, 100.0, 200.0, 500.0, 1000.0],
            bidirectional_paths: false,
            max_cycles: 20,
            cycle_scan_depth: 4,
            cycle_scan_wallets: 50,
            report_top: 10,
            findings_log: false,
            findings_log_path: "./logs/findings.log".to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_ceilings(raw: &str) -> Option<Vec<f64>> {
    raw.split(',')
        .map(|s| s.trim().parse::<f64>().ok())
        .collect()
}

// ============================================
// FINDINGS LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One line of the findings log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingLog {
    pub timestamp: DateTime<Utc>,
    /// Which search produced it
    pub search: String,
    pub subject: String,
    pub path: Vec<String>,
    pub label: String,
    pub score: f64,
    pub total_amount: f64,
}

impl FindingLog {
    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
