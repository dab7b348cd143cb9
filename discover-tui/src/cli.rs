//! Command-line options

use std::time::Duration;

use clap::ArgAction;
use clap::Parser;
use discover_lib::cache::ViewConfig;
use log::LevelFilter;

/// Public mock endpoint serving the sample user table.
pub const DEFAULT_ENDPOINT: &str = "https://6396e71c77359127a025f847.mockapi.io/dw/users";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "discover",
    version,
    about = "Browse a paginated user table from the terminal",
    long_about = "DiscoverWeb in the terminal: an infinitely scrolling, sortable, filterable table fed by a paginated JSON endpoint.\n\nExamples:\n  discover\n  discover --endpoint http://localhost:3000/users --page-size 25\n  discover --dark -vv"
)]
pub struct Args {
    #[arg(
        short = 'e',
        long,
        default_value = DEFAULT_ENDPOINT,
        help = "Endpoint serving { items, count } pages."
    )]
    pub endpoint: String,

    #[arg(
        short = 'p',
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Rows requested per page."
    )]
    pub page_size: u32,

    #[arg(
        long,
        default_value_t = 500,
        help = "Delay before typed search text is applied, in milliseconds."
    )]
    pub debounce_ms: u64,

    #[arg(long, help = "Per-request timeout in seconds. No timeout when omitted.")]
    pub timeout_secs: Option<u64>,

    #[arg(
        long,
        default_value_t = 3,
        help = "Rows from the bottom at which the next page is requested."
    )]
    pub bottom_threshold: u16,

    #[arg(long, help = "Start in dark mode.")]
    pub dark: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,
}

impl Args {
    /// Log level for the file logger.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig::default()
            .with_page_size(self.page_size as usize)
            .with_bottom_threshold(f64::from(self.bottom_threshold))
    }
}
