//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;
use tracing::{debug, info};

use crate::state::TimerConfig;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "slot-timer")]
#[command(about = "A drift-free stopwatch with a slot list, served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Interval between timer ticks in milliseconds
    #[arg(short, long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub rate: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Tick interval as a duration
    pub fn rate(&self) -> Duration {
        Duration::from_millis(self.rate)
    }

    /// Timer configuration with logging hooks
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::new(self.rate())
            .on_start(|| info!("Timer running"))
            .on_pause(|| info!("Timer paused"))
            .on_stop(|| info!("Timer stopped and reset"))
            .on_tick(|| debug!("Timer tick"))
    }
}
