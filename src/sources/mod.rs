//! Market data sources.
//!
//! Each source is a single HTTP call with its own response shape. Commands
//! depend on the [`MarketData`] trait so they can be exercised without the
//! network.

pub mod frankfurter;
pub mod fred;
pub mod multpl;

use crate::config::Config;
use crate::errors::SourceError;
use crate::models::{ExchangeQuery, ExchangeResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

pub use frankfurter::FrankfurterClient;
pub use fred::{FredClient, Series};
pub use multpl::MultplClient;

/// Source of every indicator the reports use.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// 10-year treasury yield, percent.
    async fn treasury_yield(&self) -> Result<f64, SourceError>;

    /// Moody's AAA corporate bond yield, percent.
    async fn aaa_yield(&self) -> Result<f64, SourceError>;

    /// Moody's BAA corporate bond yield, percent.
    async fn baa_yield(&self) -> Result<f64, SourceError>;

    /// Current Shiller CAPE ratio.
    async fn shiller_cape(&self) -> Result<f64, SourceError>;

    /// Currency conversion.
    async fn exchange_rate(&self, query: &ExchangeQuery) -> Result<ExchangeResult, SourceError>;
}

/// [`MarketData`] backed by FRED, Multpl and Frankfurter.
pub struct LiveMarketData {
    fred: FredClient,
    multpl: MultplClient,
    frankfurter: FrankfurterClient,
}

impl LiveMarketData {
    /// Build the live sources sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(config.http.timeout_seconds)?;

        Ok(Self {
            fred: FredClient::new(http.clone(), config.fred.resolve_api_key()),
            multpl: MultplClient::new(http.clone()),
            frankfurter: FrankfurterClient::new(http),
        })
    }
}

#[async_trait]
impl MarketData for LiveMarketData {
    async fn treasury_yield(&self) -> Result<f64, SourceError> {
        self.fred.latest(Series::Treasury10Y).await
    }

    async fn aaa_yield(&self) -> Result<f64, SourceError> {
        self.fred.latest(Series::Aaa).await
    }

    async fn baa_yield(&self) -> Result<f64, SourceError> {
        self.fred.latest(Series::Baa).await
    }

    async fn shiller_cape(&self) -> Result<f64, SourceError> {
        self.multpl.shiller_cape().await
    }

    async fn exchange_rate(&self, query: &ExchangeQuery) -> Result<ExchangeResult, SourceError> {
        self.frankfurter.convert(query).await
    }
}

/// Build the shared HTTP client. The timeout is the only bound on a hung source.
pub fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .context("Failed to create HTTP client")
}
