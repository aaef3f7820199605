//! Error types for each seam of the application.
//!
//! Library-level code returns these typed errors; the command layer wraps
//! them with `anyhow` context before they reach the user.

use thiserror::Error;

/// Failure of a single data source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("missing field in response: {0}")]
    MissingField(String),

    #[error("{0} is not set (config file or environment)")]
    MissingCredential(&'static str),

    #[error("invalid value {value}: {reason}")]
    InvalidValue { value: String, reason: &'static str },

    #[error("{0}")]
    Upstream(String),
}

/// Failure of a fan-out/fan-in aggregation.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// The first failing source in priority order.
    #[error("failed to fetch {name}: {source}")]
    Source {
        name: &'static str,
        #[source]
        source: SourceError,
    },

    #[error("no {0} reading was collected")]
    MissingReading(&'static str),
}

/// Failure to deliver a push notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{0} is not set (config file or environment)")]
    MissingCredential(&'static str),

    #[error("failed to send message: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse Telegram response: {0}")]
    Parse(String),

    #[error("Telegram API returned an error: {0}")]
    Rejected(String),
}

/// Failure of an external process.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_description(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no adb devices found")]
    NoDevices,

    #[error("device {0} is not attached")]
    UnknownDevice(String),

    #[error("invalid device selection: {0}")]
    InvalidSelection(String),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Failure to read, write, or query the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("destination name must not be empty")]
    EmptyDestination,

    #[error("no destination {0} in config")]
    UnknownDestination(String),

    #[error("destination {name} has no {field}")]
    MissingDestinationField { name: String, field: &'static str },

    #[error("{field} must be greater than 0")]
    ZeroSetting { field: &'static str },
}
