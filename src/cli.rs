//! Command-line interface definitions for the news wire simulator.
//!
//! Every option can also come from an environment variable. Options left
//! unset fall back to the YAML config file, then to built-in defaults.

use crate::sink::OutputStyle;
use clap::Parser;

/// Command-line arguments for the news wire simulator.
///
/// # Examples
///
/// ```sh
/// # Three default sources, runs until Ctrl-C
/// newswire_sim
///
/// # Two sources, faster cycles, stop after a minute
/// newswire_sim --sources Madrid,Londres --min-delay-ms 100 --max-delay-ms 500 --run-for 60
///
/// # Settings from a file, compact JSON records
/// newswire_sim -c ./config.yaml --output json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "NEWSWIRE_CONFIG")]
    pub config: Option<String>,

    /// Comma-separated list of source names to simulate
    #[arg(short, long, env = "NEWSWIRE_SOURCES", value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Minimum wait between two fetches of a source, in milliseconds
    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    /// Maximum wait between two fetches of a source, in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Probability that a fetch finds its source unavailable
    #[arg(long)]
    pub failure_probability: Option<f64>,

    /// Name of the central aggregator the records are attributed to
    #[arg(long, env = "NEWSWIRE_SINK_NAME")]
    pub sink_name: Option<String>,

    /// Record layout written by the central sink
    #[arg(short, long, value_enum)]
    pub output: Option<OutputStyle>,

    /// Seed for reproducible runs
    #[arg(long, env = "NEWSWIRE_SEED")]
    pub seed: Option<u64>,

    /// Stop each source after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Stop the whole simulation after this many seconds
    #[arg(long)]
    pub run_for: Option<u64>,
}
