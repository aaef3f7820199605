//! Shiller CAPE scraped from multpl.com.

use crate::errors::SourceError;
use regex::Regex;
use std::sync::OnceLock;

const MULTPL_SHILLER_PE_URL: &str = "https://www.multpl.com/shiller-pe";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; lucky/1.0)";

fn primary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:current\s+)?shiller\s+pe\s+ratio\s+(?:is\s+)?(\d+\.?\d*)")
            .expect("valid regex")
    })
}

fn fallback_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r">(\d{2}\.\d{2})<").expect("valid regex"))
}

/// Client for the Multpl Shiller PE page.
#[derive(Clone)]
pub struct MultplClient {
    http: reqwest::Client,
    url: String,
}

impl MultplClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            url: MULTPL_SHILLER_PE_URL.to_string(),
        }
    }

    /// Fetch the current Shiller CAPE ratio.
    pub async fn shiller_cape(&self) -> Result<f64, SourceError> {
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        parse_cape(&body)
    }
}

/// Extract the CAPE value from the page HTML.
pub fn parse_cape(html: &str) -> Result<f64, SourceError> {
    let captures = primary_pattern()
        .captures(html)
        .or_else(|| fallback_pattern().captures(html))
        .ok_or_else(|| SourceError::Parse("no CAPE value found on page".to_string()))?;

    let raw = &captures[1];
    raw.parse()
        .map_err(|_| SourceError::Parse(format!("not a number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentence() {
        let html = r#"<div id="current">Current Shiller PE Ratio is 40.45</div>"#;
        assert_eq!(parse_cape(html).unwrap(), 40.45);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let html = "<meta content=\"shiller pe ratio 37.1 as of today\">";
        assert_eq!(parse_cape(html).unwrap(), 37.1);
    }

    #[test]
    fn test_parse_fallback_number() {
        let html = r#"<div id="current"><b>Shiller PE:</b><span>38.72</span></div>"#;
        assert_eq!(parse_cape(html).unwrap(), 38.72);
    }

    #[test]
    fn test_parse_no_value() {
        let err = parse_cape("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
