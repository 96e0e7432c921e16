// Telegram Bot API client: text messages and photo uploads.
//
// Base path: /bot{token}/
// Auth: the bot token is part of the URL path, so URLs are never logged.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// File name attached to every uploaded photo.
pub const PHOTO_FILE_NAME: &str = "capture.jpg";

/// Every Bot API response carries `ok`; failures add a `description`.
#[derive(Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Async client for the two Bot API methods the pipeline needs.
///
/// Messages go to a single fixed chat. Response bodies are only inspected
/// for the `ok` flag and otherwise discarded.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: Url,
    bot_token: SecretString,
    chat_id: String,
    upload_timeout: Duration,
}

impl TelegramClient {
    /// Build a client from a `TransportConfig`.
    ///
    /// `transport.timeout` applies to text messages; photo uploads use the
    /// separate `upload_timeout`.
    pub fn new(
        base_url: &str,
        bot_token: SecretString,
        chat_id: impl Into<String>,
        transport: &TransportConfig,
        upload_timeout: Duration,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, bot_token, chat_id)?;
        client.upload_timeout = upload_timeout;
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        bot_token: SecretString,
        chat_id: impl Into<String>,
    ) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));
        Ok(Self {
            http,
            base_url,
            bot_token,
            chat_id: chat_id.into(),
            upload_timeout: Duration::from_secs(30),
        })
    }

    /// `{base}/bot{token}/{method}`
    fn method_url(&self, method: &str) -> Result<Url, Error> {
        let token = self.bot_token.expose_secret();
        // Tokens contain ':'; the "./" keeps the segment from parsing as a scheme.
        Ok(self.base_url.join(&format!("./bot{token}/{method}"))?)
    }

    /// Send a plain-text message. No parse mode is set, so the text is
    /// delivered verbatim.
    pub async fn send_message(&self, text: &str) -> Result<(), Error> {
        debug!(chat_id = %self.chat_id, len = text.len(), "POST sendMessage");

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("text", text.to_owned());

        let resp = self
            .http
            .post(self.method_url("sendMessage")?)
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    /// Upload one JPEG photo.
    pub async fn send_photo(&self, photo: Vec<u8>) -> Result<(), Error> {
        debug!(chat_id = %self.chat_id, bytes = photo.len(), "POST sendPhoto");

        let part = Part::bytes(photo)
            .file_name(PHOTO_FILE_NAME)
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("photo", part);

        let resp = self
            .http
            .post(self.method_url("sendPhoto")?)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn handle_response(resp: reqwest::Response) -> Result<(), Error> {
        let body: BotResponse = transport::read_json(resp).await?;
        if body.ok {
            Ok(())
        } else {
            Err(Error::Provider {
                message: body
                    .description
                    .unwrap_or_else(|| "Bot API returned ok=false".into()),
            })
        }
    }
}
