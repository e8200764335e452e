//! Telegram delivery for availability notifications.

use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use teloxide::prelude::*;

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }

    /// Talk to a Bot API server other than api.telegram.org.
    pub fn with_api_url(bot_token: &str, api_url: url::Url) -> Self {
        Self {
            bot: Bot::new(bot_token).set_api_url(api_url),
        }
    }

    /// Build the notifier and verify the token against `getMe`.
    pub async fn connect(bot_token: &str) -> Result<Self> {
        Self::new(bot_token).authorize().await
    }

    pub async fn authorize(self) -> Result<Self> {
        let me = self.bot.get_me().await?;

        tracing::info!(
            "Authorized on account {}",
            me.user.username.as_deref().unwrap_or("<unnamed>")
        );

        Ok(self)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) {
        match self.bot.send_message(ChatId(chat_id), text).await {
            Ok(message) => {
                tracing::info!(chat_id, message_id = message.id.0, "Notification sent")
            }
            Err(e) => tracing::error!(chat_id, error = %e, "Failed to send Telegram message"),
        }
    }
}
