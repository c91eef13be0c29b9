//! CyberAPI threat check
//!
//! Small command line front end for the library: checks each target given
//! on the command line and prints its risk score, verdict and signals.

use cyberapi::core::config::Config;
use cyberapi::core::logging::init_logging;
use cyberapi::{ThreatQuery, ThreatQueryClient, ThreatResult};
use futures::future::join_all;
use std::net::IpAddr;
use tracing::info;

/// Target checked when none are given
const DEFAULT_TARGET: &str = "example.com";

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Check for --help flag
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return;
    }

    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    let client = ThreatQueryClient::from_config(config.client_config());
    info!(base_url = %config.base_url, "Using threat intelligence API");

    let targets = if args.is_empty() {
        vec![DEFAULT_TARGET.to_string()]
    } else {
        args
    };

    let queries: Vec<ThreatQuery> = targets.iter().map(|t| target_query(t)).collect();
    let results = join_all(queries.iter().map(|q| client.check_query(q))).await;

    let mut failed = false;
    for (target, result) in targets.iter().zip(results) {
        println!("Checking {}...", target);
        match result {
            Ok(report) => print_report(&report),
            Err(e) => {
                eprintln!("   Error: {}", e);
                failed = true;
            }
        }
        println!();
    }

    if failed {
        std::process::exit(1);
    }
}

/// Targets that parse as an IP address are sent as `ip`, the rest as `domain`
fn target_query(target: &str) -> ThreatQuery {
    if target.parse::<IpAddr>().is_ok() {
        ThreatQuery::ip(target)
    } else {
        ThreatQuery::domain(target)
    }
}

fn print_report(report: &ThreatResult) {
    println!("   Risk Score: {}", report.risk_score);
    println!("   Verdict: {}", report.verdict);
    if let Some(country) = report.country() {
        println!("   Location: {}", country);
    }
    let signals = report.signal_list();
    if !signals.is_empty() {
        println!("   Signals: {}", signals.join(", "));
    }
}

/// Print help message
fn print_help() {
    println!("CyberAPI threat check v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: cyberapi-check [OPTIONS] [TARGET...]");
    println!();
    println!("Targets are domains or IP addresses (default: {}).", DEFAULT_TARGET);
    println!();
    println!("Options:");
    println!("  -h, --help    Display this help message");
    println!();
    println!("Environment variables:");
    println!("  CYBERAPI_KEY - Your API key (default: demo)");
    println!("  CONFIG_PATH - TOML config file (default: cyberapi.toml)");
    println!("  RUST_LOG - Log filter, overrides [logging] log_level");
}
