//! Best-effort Telegram pushes. Handlers dispatch these from detached
//! tasks; a failed send is logged and lost, never retried and never
//! surfaced to the client.

use std::time::Duration;

use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error};

use crate::config::TelegramConfig;
use crate::posts::repo::Category;
use crate::visitors::VisitorInfo;

#[derive(Clone)]
struct Credentials {
    bot_token: String,
    chat_id: String,
}

pub struct Notifier {
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl Notifier {
    /// Missing credentials produce a disabled notifier rather than an
    /// error; the app runs fine without Telegram.
    pub fn from_config(config: &TelegramConfig) -> Self {
        let credentials = match (config.bot_token.clone(), config.chat_id.clone()) {
            (Some(bot_token), Some(chat_id)) => Some(Credentials { bot_token, chat_id }),
            _ => None,
        };
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            credentials,
        }
    }

    pub async fn notify_new_user(&self, name: &str, email: &str, visitor: &VisitorInfo) {
        self.send(new_user_message(name, email, visitor, OffsetDateTime::now_utc()))
            .await;
    }

    pub async fn notify_new_post(
        &self,
        title: &str,
        content: &str,
        category: Category,
        author: &str,
    ) {
        self.send(new_post_message(
            title,
            content,
            category,
            author,
            OffsetDateTime::now_utc(),
        ))
        .await;
    }

    async fn send(&self, text: String) {
        let Some(credentials) = &self.credentials else {
            debug!("telegram credentials not set, skipping notification");
            return;
        };

        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            credentials.bot_token
        );
        let result = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": credentials.chat_id,
                "text": text,
            }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("telegram notification sent");
            }
            Ok(response) => {
                error!(status = %response.status(), "telegram notification rejected");
            }
            Err(e) => {
                error!(error = %e, "telegram notification failed");
            }
        }
    }
}

fn format_time(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

fn new_user_message(name: &str, email: &str, visitor: &VisitorInfo, at: OffsetDateTime) -> String {
    format!(
        "📝 New user registered\n\n\
         👤 Name: {name}\n\
         📧 Email: {email}\n\
         🌐 IP: {ip}\n\
         📱 Device: {platform}\n\
         🕒 Time: {time}",
        ip = visitor.ip,
        platform = visitor.platform,
        time = format_time(at),
    )
}

fn new_post_message(
    title: &str,
    content: &str,
    category: Category,
    author: &str,
    at: OffsetDateTime,
) -> String {
    let excerpt: String = if content.chars().count() > 100 {
        let head: String = content.chars().take(100).collect();
        format!("{head}...")
    } else {
        content.to_string()
    };
    format!(
        "📖 New post published\n\n\
         ✍️ Title: {title}\n\
         👤 By: {author}\n\
         📂 Category: {category:?}\n\
         🕒 Time: {time}\n\n\
         {excerpt}",
        time = format_time(at),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn disabled_without_credentials() {
        let notifier = Notifier::from_config(&TelegramConfig {
            bot_token: None,
            chat_id: Some("42".into()),
        });
        assert!(notifier.credentials.is_none());
    }

    #[test]
    fn user_message_carries_visitor_context() {
        let visitor = VisitorInfo::from_headers(&HeaderMap::new());
        let message =
            new_user_message("Sari", "sari@example.com", &visitor, OffsetDateTime::UNIX_EPOCH);
        assert!(message.contains("Sari"));
        assert!(message.contains("sari@example.com"));
        assert!(message.contains("IP: unknown"));
        assert!(message.contains("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn post_message_truncates_long_content() {
        let content = "a".repeat(150);
        let message = new_post_message(
            "Rain",
            &content,
            Category::Nature,
            "Sari",
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(message.contains(&format!("{}...", "a".repeat(100))));
        assert!(!message.contains(&"a".repeat(101)));
    }

    #[test]
    fn post_message_keeps_short_content() {
        let message = new_post_message(
            "Rain",
            "short body",
            Category::Life,
            "Sari",
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(message.contains("short body"));
        assert!(!message.contains("..."));
    }
}
