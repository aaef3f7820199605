//! FRED (Federal Reserve Economic Data) yield series.

use crate::errors::SourceError;
use serde::Deserialize;
use tracing::debug;

const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// FRED's marker for a missing observation.
const MISSING_VALUE: &str = ".";

/// Yield series used as PE benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    /// 10-year treasury constant maturity rate.
    Treasury10Y,
    /// Moody's seasoned AAA corporate bond yield.
    Aaa,
    /// Moody's seasoned BAA corporate bond yield.
    Baa,
}

impl Series {
    pub fn id(&self) -> &'static str {
        match self {
            Series::Treasury10Y => "DGS10",
            Series::Aaa => "AAA",
            Series::Baa => "BAA",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    value: String,
}

/// Client for the FRED observations endpoint.
#[derive(Clone)]
pub struct FredClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl FredClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            base_url: FRED_OBSERVATIONS_URL.to_string(),
        }
    }

    /// Fetch the latest available value of a series, in percent.
    pub async fn latest(&self, series: Series) -> Result<f64, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("FRED_API_KEY"))?;

        debug!("Requesting FRED series {}", series.id());

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("series_id", series.id()),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "10"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        parse_latest_observation(&body)
    }
}

/// Extract the newest usable observation from a descending observations payload.
pub fn parse_latest_observation(body: &str) -> Result<f64, SourceError> {
    let response: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let raw = response
        .observations
        .iter()
        .map(|obs| obs.value.trim())
        .find(|value| *value != MISSING_VALUE)
        .ok_or_else(|| SourceError::MissingField("observations".to_string()))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| SourceError::Parse(format!("not a number: {raw}")))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SourceError::InvalidValue {
            value: raw.to_string(),
            reason: "yield must be a positive number",
        });
    }

    Ok(value)
}
