use tracing::warn;

use crate::bot::data::Data;
use crate::services::spam::clock::Clock;
use crate::utils::formatting::{display_name, truncate};

/// An inbound message as seen by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: u64,
    pub username: Option<String>,
    /// `None` for non-text content, which is guarded as an empty text
    pub text: Option<String>,
}

impl IncomingMessage {
    pub fn new(user_id: u64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            username: None,
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Run the flood guard for a message before any handler sees it.
/// Returns the reply to send back when the message is rejected.
pub fn guard_message<C: Clock>(data: &Data<C>, message: &IncomingMessage) -> Option<String> {
    let decision = data.rate_limiter.evaluate(message.user_id, message.text());
    let rejection = decision.rejection()?;

    warn!(
        "Spam protection triggered for {} (ID: {}) on {:?}: {}",
        display_name(message.username.as_deref()),
        message.user_id,
        truncate(message.text(), 64),
        rejection
    );

    Some(rejection.to_string())
}
