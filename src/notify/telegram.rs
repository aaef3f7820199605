//! Telegram Bot API push.

use super::Notifier;
use crate::config::TelegramConfig;
use crate::errors::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org/bot";

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to one chat through a bot.
pub struct TelegramNotifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(http: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http,
            bot_token,
            chat_id,
        }
    }

    /// Build a notifier from config, falling back to the environment for credentials.
    pub fn from_config(
        http: reqwest::Client,
        config: &TelegramConfig,
    ) -> Result<Self, NotifyError> {
        let bot_token = config
            .resolve_bot_token()
            .ok_or(NotifyError::MissingCredential("TELEGRAM_BOT_TOKEN"))?;
        let chat_id = config
            .resolve_chat_id()
            .ok_or(NotifyError::MissingCredential("TELEGRAM_CHAT_ID"))?;

        Ok(Self::new(http, bot_token, chat_id))
    }

    fn send_message_url(&self) -> String {
        format!("{}{}/sendMessage", TELEGRAM_API_BASE_URL, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: Some("Markdown"),
        };

        debug!("Sending {} byte message to chat {}", text.len(), self.chat_id);

        let response = self
            .http
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await?;

        let body = response.text().await?;
        check_response(&body)?;

        debug!("Telegram message delivered");
        Ok(())
    }
}

/// Interpret a Bot API response body.
fn check_response(body: &str) -> Result<(), NotifyError> {
    let response: TelegramResponse =
        serde_json::from_str(body).map_err(|e| NotifyError::Parse(e.to_string()))?;

    if response.ok {
        Ok(())
    } else {
        Err(NotifyError::Rejected(
            response
                .description
                .unwrap_or_else(|| "no description".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let request = SendMessageRequest {
            chat_id: "42",
            text: "*hello*",
            parse_mode: Some("Markdown"),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["text"], "*hello*");
        assert_eq!(json["parse_mode"], "Markdown");
    }

    #[test]
    fn test_check_response_ok() {
        assert!(check_response(r#"{"ok":true,"result":{}}"#).is_ok());
    }

    #[test]
    fn test_check_response_rejected() {
        let err = check_response(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(ref d) if d.contains("chat not found")));
    }

    #[test]
    fn test_check_response_invalid_json() {
        assert!(matches!(
            check_response("<html>502</html>").unwrap_err(),
            NotifyError::Parse(_)
        ));
    }

    #[test]
    fn test_send_message_url() {
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            "123:abc".to_string(),
            "42".to_string(),
        );
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_from_config_uses_configured_values() {
        let config = TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            chat_id: Some("42".to_string()),
        };

        let notifier = TelegramNotifier::from_config(reqwest::Client::new(), &config).unwrap();
        assert_eq!(notifier.chat_id, "42");
    }
}
