//! Subcommand handlers.
//!
//! Handlers return the text destined for stdout instead of printing it, so
//! the dispatcher owns the terminal and tests can inspect the output.

pub mod market;
pub mod ops;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::notify::{Notifier, TelegramNotifier};
use crate::sources::build_http_client;
use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// How report commands present their results.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// A stderr spinner, or `None` in quiet or JSON mode.
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.quiet || self.is_json() {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Render a report as JSON or through the given table renderer.
    pub fn render<T, F>(&self, report: &T, table: F) -> Result<String>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Json => crate::report::generate_json_report(report),
            OutputFormat::Table => Ok(table(report)),
        }
    }

    /// Append a push confirmation line in table mode only, keeping JSON
    /// output parseable.
    pub fn confirm(&self, text: &mut String, line: &str) {
        if !self.is_json() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(line);
            text.push('\n');
        }
    }
}

pub(crate) fn finish(spinner: Option<ProgressBar>) {
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

/// Build the Telegram notifier only when a push was requested.
pub fn notifier_for(config: &Config, wanted: bool) -> Result<Option<TelegramNotifier>> {
    if !wanted {
        return Ok(None);
    }

    let http = build_http_client(config.http.timeout_seconds)?;
    Ok(Some(TelegramNotifier::from_config(http, &config.telegram)?))
}

pub fn as_notifier(notifier: &Option<TelegramNotifier>) -> Option<&dyn Notifier> {
    notifier.as_ref().map(|n| n as &dyn Notifier)
}

/// Send a message, naming what was being pushed on failure.
pub async fn push(notifier: &dyn Notifier, text: &str, what: &str) -> Result<()> {
    notifier
        .send(text)
        .await
        .map_err(|e| anyhow!("Failed to push {} to Telegram: {}", what, e))?;

    info!("Pushed {} to Telegram", what);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;

    #[test]
    fn test_confirm_skipped_for_json() {
        let json = Output::new(OutputFormat::Json, false);
        let mut text = "{}".to_string();
        json.confirm(&mut text, "✅ pushed");
        assert_eq!(text, "{}");

        let table = Output::new(OutputFormat::Table, false);
        table.confirm(&mut text, "✅ pushed");
        assert_eq!(text, "{}\n✅ pushed\n");
    }

    #[test]
    fn test_no_spinner_when_quiet_or_json() {
        assert!(Output::new(OutputFormat::Table, true).spinner("x").is_none());
        assert!(Output::new(OutputFormat::Json, false).spinner("x").is_none());
    }

    #[test]
    fn test_notifier_only_built_when_wanted() {
        assert!(notifier_for(&Config::default(), false).unwrap().is_none());

        let mut config = Config::default();
        config.telegram.bot_token = Some("123:abc".to_string());
        config.telegram.chat_id = Some("42".to_string());
        assert!(notifier_for(&config, true).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_push_failure_names_payload() {
        let notifier = RecordingNotifier::failing("chat not found");
        let err = push(&notifier, "hi", "CAPE valuation").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Failed to push CAPE valuation to Telegram"));
        assert!(message.contains("chat not found"));
    }
}
