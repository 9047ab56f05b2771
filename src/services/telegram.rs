//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;
use crate::services::Notifier;

const PARSE_MODE: &str = "HTML";

/// Notifier posting to one Telegram chat through the Bot API.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        config: &NotifierConfig,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// POST `payload` to a Bot API method.
    ///
    /// Errors never carry the request URL, which embeds the bot token.
    async fn call<P: Serialize + Sync>(&self, method: &str, payload: &P) -> Result<()> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::notify(method, e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::notify(method, e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(reply) if status.is_success() && reply.ok => {
                log::debug!("Telegram {method} accepted");
                Ok(())
            }
            Ok(reply) => Err(AppError::notify(
                method,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    reply
                        .description
                        .unwrap_or_else(|| "request rejected".to_string())
                ),
            )),
            Err(_) => Err(AppError::notify(
                method,
                format!("HTTP {}: unreadable response", status.as_u16()),
            )),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, caption: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: caption,
            parse_mode: PARSE_MODE,
        };
        self.call("sendMessage", &payload).await
    }

    async fn send_photo(&self, url: &str, caption: &str) -> Result<()> {
        let payload = SendPhoto {
            chat_id: &self.chat_id,
            photo: url,
            caption,
            parse_mode: PARSE_MODE,
        };
        self.call("sendPhoto", &payload).await
    }

    async fn send_media_group(&self, urls: &[String], caption: &str) -> Result<()> {
        let payload = SendMediaGroup {
            chat_id: &self.chat_id,
            media: media_group(urls, caption),
        };
        self.call("sendMediaGroup", &payload).await
    }
}

fn media_group<'a>(urls: &'a [String], caption: &'a str) -> Vec<InputMediaPhoto<'a>> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| InputMediaPhoto {
            kind: "photo",
            media: url,
            caption: (i == 0).then_some(caption),
            parse_mode: (i == 0).then_some(PARSE_MODE),
        })
        .collect()
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'static str,
}

#[derive(Serialize)]
struct SendMediaGroup<'a> {
    chat_id: &'a str,
    media: Vec<InputMediaPhoto<'a>>,
}

#[derive(Serialize)]
struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}
