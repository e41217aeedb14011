use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use time_primitives::Micros;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on
    pub address: String,

    /// Port to listen on
    pub port: u16,

    /// How often the player is updated
    pub tick_interval: Duration,

    /// Minimum spacing between broadcast position announcements
    pub position_period: Micros,

    /// Longest command line accepted from a client, in bytes
    pub max_line_length: usize,

    /// Responses queued for one client before it is disconnected
    pub outbox_capacity: usize,
}

/// playd - a minimal audio player daemon
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub address: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 1350)]
    pub port: u16,

    /// Milliseconds between player updates
    #[arg(long, default_value_t = 10)]
    pub tick_ms: u64,

    /// Milliseconds between broadcast TIME announcements while playing
    #[arg(long, default_value_t = 500)]
    pub position_period_ms: u64,

    /// Longest command line accepted from a client, in bytes
    #[arg(long, default_value_t = 4096)]
    pub max_line_length: usize,

    /// Responses queued for a client that isn't reading before it is dropped
    #[arg(long, default_value_t = 1024)]
    pub outbox_capacity: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--tick-ms must be greater than zero")]
    ZeroTick,

    #[error("--position-period-ms must be greater than zero")]
    ZeroPositionPeriod,

    #[error("--max-line-length must be greater than zero")]
    ZeroLineLength,

    #[error("--outbox-capacity must be greater than zero")]
    ZeroOutboxCapacity,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if args.position_period_ms == 0 {
            return Err(ConfigError::ZeroPositionPeriod);
        }
        if args.max_line_length == 0 {
            return Err(ConfigError::ZeroLineLength);
        }
        if args.outbox_capacity == 0 {
            return Err(ConfigError::ZeroOutboxCapacity);
        }

        Ok(Self {
            address: args.address,
            port: args.port,
            tick_interval: Duration::from_millis(args.tick_ms),
            position_period: Micros::from_millis(args.position_period_ms),
            max_line_length: args.max_line_length,
            outbox_capacity: args.outbox_capacity,
        })
    }

    /// The `host:port` string to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
