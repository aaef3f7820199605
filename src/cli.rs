//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::round_cents;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lucky - market valuation reports and server chores from one CLI
///
/// Fetches treasury and corporate bond yields, the Shiller CAPE and exchange
/// rates concurrently, renders them as tables, and pushes them to Telegram.
/// Also reboots cloud instances, opens SSH sessions, and taps Android devices.
///
/// Examples:
///   lucky pe --baa
///   lucky cape --push
///   lucky forex usd cny --amount 100
///   lucky daily --push --forex-to JPY
///   lucky ssh tokyo
///   lucky game --count 20 --interval 3
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, uses ~/.lucky/config.toml
    #[arg(short, long, value_name = "FILE", env = "LUCKY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for reports (table, json)
    #[arg(long, default_value = "table", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// HTTP request timeout in seconds
    ///
    /// Bounds every upstream call. Default: from config or 30s.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Terminal tables (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the PE ladder implied by treasury and AAA yields
    Pe {
        /// Include the Moody's BAA corporate bond yield
        #[arg(long)]
        baa: bool,
    },

    /// Push the PE report (treasury, AAA, BAA) to Telegram
    Push,

    /// Compare the Shiller CAPE with the treasury-implied fair PE
    Cape {
        /// Also push the result to Telegram
        #[arg(short, long)]
        push: bool,
    },

    /// Convert between two currencies
    ///
    /// Common codes: USD, EUR, CNY, JPY, GBP, AUD, CAD, CHF, HKD, SGD
    Forex(ForexArgs),

    /// Combined report: PE, CAPE and one exchange rate
    Daily(DailyArgs),

    /// Open an SSH session to a configured destination
    Ssh {
        /// Destination name from the [dest] config table
        dest: String,
    },

    /// Reboot a configured destination's Lighthouse instance
    Reboot {
        /// Destination name from the [dest] config table
        dest: String,
    },

    /// Tap an Android device over ADB at a fixed interval
    Game(GameArgs),

    /// Inspect and edit destinations
    #[command(subcommand)]
    Dest(DestCommand),

    /// Generate a default ~/.lucky/config.toml
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ForexArgs {
    /// Source currency code
    pub from: String,

    /// Target currency code
    pub to: String,

    /// Amount of the source currency
    #[arg(short, long, default_value = "1")]
    pub amount: f64,

    /// Also push the result to Telegram
    #[arg(short, long)]
    pub push: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DailyArgs {
    /// Also push the report to Telegram
    #[arg(short, long)]
    pub push: bool,

    /// Source currency for the exchange section
    #[arg(long, default_value = "USD", value_name = "CODE")]
    pub forex_from: String,

    /// Target currency for the exchange section
    #[arg(long, default_value = "CNY", value_name = "CODE")]
    pub forex_to: String,

    /// Amount for the exchange section
    #[arg(long, default_value = "1")]
    pub forex_amount: f64,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct GameArgs {
    /// Device serial; prompts when several devices are attached
    #[arg(short, long, value_name = "SERIAL")]
    pub device: Option<String>,

    /// Stop after this many taps (default: run until Ctrl-C)
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Seconds between taps. Overrides config file setting.
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Path to the adb binary. Overrides config file setting.
    #[arg(long, value_name = "PATH")]
    pub adb: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DestCommand {
    /// List configured destinations
    List,

    /// Add or replace a destination
    Add {
        /// Destination name
        name: String,

        /// SSH target, e.g. root@example.com
        #[arg(long)]
        ssh: String,

        /// Cloud region, e.g. ap-beijing
        #[arg(long, default_value = "")]
        region: String,

        /// Lighthouse instance id
        #[arg(long, default_value = "")]
        instance_id: String,
    },
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match self.command {
            Command::Forex(ref forex) => {
                validate_currency(&forex.from)?;
                validate_currency(&forex.to)?;
                validate_amount(forex.amount)?;
            }
            Command::Daily(ref daily) => {
                validate_currency(&daily.forex_from)?;
                validate_currency(&daily.forex_to)?;
                validate_amount(daily.forex_amount)?;
            }
            Command::Ssh { ref dest } | Command::Reboot { ref dest } => {
                if dest.trim().is_empty() {
                    return Err("Destination name must not be empty".to_string());
                }
            }
            Command::Game(ref game) => {
                if game.interval == Some(0) {
                    return Err("Interval must be at least 1 second".to_string());
                }
                if game.count == Some(0) {
                    return Err("Count must be at least 1".to_string());
                }
            }
            Command::Dest(DestCommand::Add {
                ref name, ref ssh, ..
            }) => {
                if name.trim().is_empty() {
                    return Err("Destination name must not be empty".to_string());
                }
                if ssh.trim().is_empty() {
                    return Err("--ssh must not be empty".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Currency codes are three ASCII letters, any case.
fn validate_currency(code: &str) -> Result<(), String> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("Invalid currency code: '{}' (expected e.g. USD)", code));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("Amount must be a positive number, got {}", amount));
    }
    // Amounts are sent upstream in whole cents.
    if round_cents(amount) <= 0.0 {
        return Err(format!("Amount must be at least 0.01, got {}", amount));
    }
    Ok(())
}
