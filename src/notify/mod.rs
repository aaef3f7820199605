//! Push notifications.

pub mod telegram;

use crate::errors::NotifyError;
use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Delivers a formatted text message somewhere the user will see it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every message instead of sending it.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<String>>,
        pub fail_with: Option<String>,
    }

    impl RecordingNotifier {
        pub fn failing(description: &str) -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
                fail_with: Some(description.to_string()),
            }
        }

        pub fn sent(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            if let Some(ref description) = self.fail_with {
                return Err(NotifyError::Rejected(description.clone()));
            }
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
