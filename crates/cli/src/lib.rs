use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calltrack")]
#[command(about = "CallTrack - compare neighboring option contracts")]
#[command(version)]
pub struct Cli {
    /// Log output format (pretty, json, compact); overrides the config file
    #[arg(long, global = true, env = "CALLTRACK_LOG_FORMAT")]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API
    Start {
        /// Path to the configuration file (defaults when omitted)
        #[arg(short, long, env = "CALLTRACK_CONFIG")]
        config: Option<PathBuf>,

        /// Override the HTTP port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Validate configuration without starting the API
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "calltrack.yaml")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "calltrack.yaml")]
        output: PathBuf,
    },

    /// Run one comparison and print it as JSON
    Compare {
        /// Underlying ticker, e.g. MSFT
        ticker: String,

        /// What to vary across the result
        #[arg(value_enum)]
        mode: CompareMode,

        /// Expiration date (YYYY-MM-DD)
        date: String,

        /// Strike price
        strike: f64,

        /// calls or puts
        #[arg(default_value = "calls")]
        option_type: String,

        /// Path to the configuration file (provider settings)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Keep a deployed API warm by pinging it on an interval
    Keepalive {
        /// Base URL of the API, e.g. https://calltrack.example.com
        #[arg(long, env = "CALLTRACK_URL")]
        url: String,

        /// Seconds between rounds
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,

        /// Ticker used to warm the price endpoint
        #[arg(long, default_value = "MSFT")]
        warm_ticker: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Run a single round and exit non-zero if the API is down
        #[arg(long)]
        once: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareMode {
    /// Fixed strike across neighboring expirations
    Date,

    /// Fixed expiration across neighboring strikes
    #[value(alias = "price")]
    Strike,
}

impl CompareMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareMode::Date => "date",
            CompareMode::Strike => "strike",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
