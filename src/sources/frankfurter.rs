//! Exchange rates from the Frankfurter API (free, no key).

use crate::errors::SourceError;
use crate::models::{ExchangeQuery, ExchangeResult};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const FRANKFURTER_LATEST_URL: &str = "https://api.frankfurter.app/latest";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    date: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Client for the Frankfurter `latest` endpoint.
#[derive(Clone)]
pub struct FrankfurterClient {
    http: reqwest::Client,
    base_url: String,
}

impl FrankfurterClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: FRANKFURTER_LATEST_URL.to_string(),
        }
    }

    /// Convert `query.amount` of `query.from` into `query.to`.
    pub async fn convert(&self, query: &ExchangeQuery) -> Result<ExchangeResult, SourceError> {
        let amount = format!("{:.2}", query.amount);
        debug!("Requesting {} {} -> {}", amount, query.from, query.to);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("from", query.from.as_str()),
                ("to", query.to.as_str()),
                ("amount", amount.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        parse_conversion(&body, query)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Frankfurter explains rejected queries (e.g. unknown currency) in a
/// `{"message": ...}` body; fall back to the bare status otherwise.
fn error_from_body(status: u16, body: &str) -> SourceError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error) => SourceError::Upstream(format!("HTTP {}: {}", status, error.message)),
        Err(_) => SourceError::Status { status },
    }
}

/// Build an [`ExchangeResult`] from a `latest` payload.
///
/// The upstream `rates` entry holds the converted amount, not the unit rate,
/// so the rate is recomputed as converted / amount.
pub fn parse_conversion(body: &str, query: &ExchangeQuery) -> Result<ExchangeResult, SourceError> {
    if query.amount <= 0.0 {
        return Err(SourceError::InvalidValue {
            value: query.amount.to_string(),
            reason: "amount must be positive",
        });
    }

    let response: LatestResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let converted = *response
        .rates
        .get(&query.to)
        .ok_or_else(|| SourceError::MissingField(format!("rate for {}", query.to)))?;

    Ok(ExchangeResult {
        from: query.from.clone(),
        to: query.to.clone(),
        rate: converted / query.amount,
        amount: query.amount,
        converted,
        date: response.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_amount() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2025-01-01","rates":{"CNY":7.2345}}"#;
        let query = ExchangeQuery::new("USD", "CNY", 1.0);

        let result = parse_conversion(body, &query).unwrap();
        assert_eq!(result.rate, 7.2345);
        assert_eq!(result.converted, 7.2345);
        assert_eq!(result.date, "2025-01-01");
    }

    #[test]
    fn test_rate_is_converted_over_amount() {
        let body = r#"{"amount":100.0,"base":"USD","date":"2025-01-01","rates":{"CNY":724.56}}"#;
        let query = ExchangeQuery::new("usd", "cny", 100.0);

        let result = parse_conversion(body, &query).unwrap();
        assert!((result.rate - 7.2456).abs() < 1e-9);
        assert_eq!(result.converted, 724.56);
        assert_eq!(result.amount, 100.0);
        assert_eq!(result.from, "USD");
        assert_eq!(result.to, "CNY");
    }

    #[test]
    fn test_rate_uses_amount_sent_upstream() {
        // 1.234 is requested as 1.23, so the upstream converts 1.23 * 7.2456.
        let body = r#"{"amount":1.23,"base":"USD","date":"2025-01-01","rates":{"CNY":8.912088}}"#;
        let query = ExchangeQuery::new("USD", "CNY", 1.234);

        let result = parse_conversion(body, &query).unwrap();
        assert_eq!(result.amount, 1.23);
        assert!((result.rate - 7.2456).abs() < 1e-9);
    }

    #[test]
    fn test_sub_cent_amount_is_rejected() {
        let body = r#"{"amount":0.0,"base":"USD","date":"2025-01-01","rates":{"CNY":0.0}}"#;
        let query = ExchangeQuery::new("USD", "CNY", 0.004);
        assert!(matches!(
            parse_conversion(body, &query).unwrap_err(),
            SourceError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_currency_not_found() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2025-01-01","rates":{"EUR":0.92}}"#;
        let query = ExchangeQuery::new("USD", "CNY", 1.0);

        let err = parse_conversion(body, &query).unwrap_err();
        assert!(matches!(err, SourceError::MissingField(_)));
    }

    #[test]
    fn test_invalid_json() {
        let query = ExchangeQuery::new("USD", "CNY", 1.0);
        assert!(matches!(
            parse_conversion("not json", &query).unwrap_err(),
            SourceError::Parse(_)
        ));
    }

    #[test]
    fn test_error_body_message() {
        let err = error_from_body(404, r#"{"message":"not found"}"#);
        assert_eq!(err.to_string(), "HTTP 404: not found");

        let err = error_from_body(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, SourceError::Status { status: 502 }));
    }

    #[test]
    fn test_non_positive_amount() {
        let body = r#"{"rates":{"CNY":0.0}}"#;
        let query = ExchangeQuery::new("USD", "CNY", 0.0);
        assert!(matches!(
            parse_conversion(body, &query).unwrap_err(),
            SourceError::InvalidValue { .. }
        ));
    }
}
