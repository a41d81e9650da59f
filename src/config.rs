use std::path::PathBuf;

use clap::Parser;

use crate::constants::{CLUSTER_KEY_SIZE, KNN, KWIN};

/// Tunables consumed opaquely by the fix pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FixParams {
    /// Maximum key/observed AP set size.
    pub cluster_key_size: usize,
    /// K for the first nearest-neighbour cutoff.
    pub knn: usize,
    /// Multiplier for the dynamic proximity window.
    pub kwin: f64,
}

impl Default for FixParams {
    fn default() -> Self {
        FixParams { cluster_key_size: CLUSTER_KEY_SIZE, knn: KNN, kwin: KWIN }
    }
}

/// WLAN Fingerprint Positioning Configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Radio map file (JSON) to match against.
    #[arg(long, value_name = "FILE")]
    pub radio_map: PathBuf,

    /// Observed AP as a MAC=RSS pair, e.g. --ap 00:15:70:9e:91:60=-55. Repeatable.
    #[arg(long = "ap", value_name = "MAC=RSS", required = true)]
    pub aps: Vec<String>,

    /// K for the nearest-neighbour cutoff.
    #[arg(long, default_value_t = KNN)]
    pub knn: usize,

    /// Multiplier for the dynamic proximity window.
    #[arg(long, default_value_t = KWIN)]
    pub kwin: f64,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    pub fn fix_params(&self) -> FixParams {
        FixParams { cluster_key_size: CLUSTER_KEY_SIZE, knn: self.knn, kwin: self.kwin }
    }
}
