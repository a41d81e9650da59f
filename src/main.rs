// WLAN Fingerprint Positioning - CLI entry point
//
// Loads a radio map, takes the observed APs from the command line, runs one
// fix and prints the result.

use clap::Parser;
use tracing::{error, info};

use wlanpos::config::Config;
use wlanpos::constants::CLUSTER_KEY_SIZE;
use wlanpos::fingerprint::ObservedReading;
use wlanpos::fix::{fix_position, FixError};
use wlanpos::store::MemoryStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_logging(config.verbose);

    let store = MemoryStore::from_json_file(&config.radio_map)?;
    info!("Loaded radio map with {} clusters", store.clusters.len());

    let mut pairs = Vec::with_capacity(config.aps.len());
    for raw in &config.aps {
        pairs.push(parse_ap(raw)?);
    }
    info!("Observed APs: {}", pairs.len());

    let reading = ObservedReading::from_scan(pairs, CLUSTER_KEY_SIZE);

    match fix_position(&reading, &store, &config.fix_params()) {
        Ok(fix) => {
            println!(
                "{:.6} {:.6} {:.0}",
                fix.latitude, fix.longitude, fix.error_meters
            );
            Ok(())
        }
        Err(FixError::NoClusterFound) => {
            error!("No cluster found, fingerprinting terminated");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Parses one `MAC=RSS` argument.
fn parse_ap(raw: &str) -> Result<(String, i32), String> {
    let (mac, rss) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MAC=RSS, got '{}'", raw))?;
    let rss: i32 = rss
        .parse()
        .map_err(|_| format!("invalid RSS value in '{}'", raw))?;
    Ok((mac.to_string(), rss))
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
