//! Discord API HTTP client.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, Response, StatusCode};

use crate::api::types::*;
use crate::error::{Error, Result};

/// Discord API base URL.
const API_BASE: &str = "https://discord.com/api/v9";

/// Maximum messages per page accepted by the messages endpoint.
pub const PAGE_LIMIT: usize = 50;

const USER_AGENT: &str = concat!("discord-dl/", env!("CARGO_PKG_VERSION"));

/// Read-only view of the Discord REST API.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Fetch channel metadata.
    async fn get_channel(&self, channel_id: &str) -> Result<Channel>;

    /// Fetch server metadata.
    async fn get_guild(&self, guild_id: &str) -> Result<Guild>;

    /// Fetch one page of at most [`PAGE_LIMIT`] messages, newest first,
    /// strictly older than `before` when given.
    async fn get_messages(&self, channel_id: &str, before: Option<&str>) -> Result<Vec<Message>>;
}

/// Streamed response of a plain GET, reduced to what the downloader needs.
pub struct RemoteFile {
    pub status: u16,
    /// Entity tag, quotes included as sent by the server.
    pub etag: Option<String>,
    pub content_length: Option<u64>,
    pub body: futures::stream::BoxStream<'static, Result<bytes::Bytes>>,
}

/// Unauthenticated GET of a file URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RemoteFile>;
}

/// Discord API client authenticated with a user token.
pub struct DiscordClient {
    client: Client,
    token: String,
}

impl DiscordClient {
    /// Create a new API client.
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, token })
    }

    /// Make an authenticated GET request.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}{}", API_BASE, path);

        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(header::AUTHORIZATION, &self.token)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
        let detail = parsed
            .as_ref()
            .map(|b| b.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = parsed
                    .and_then(|b| b.retry_after)
                    .map(|s| s.ceil() as u64)
                    .unwrap_or(60);
                Err(Error::RateLimited(retry_after))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication(
                format!("HTTP {}: {}", status, detail),
            )),
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!("{} ({})", path, detail))),
            s if s.is_server_error() => Err(Error::ServerError(s.as_u16())),
            s => Err(Error::Api(format!("HTTP {} for {}: {}", s, path, detail))),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.get(path, query).await?;
        let text = response.text().await?;
        parse_body(path, &text)
    }
}

/// Decode a JSON response body, logging the start of it when it is malformed.
fn parse_body<T: serde::de::DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!(
            "Failed to parse {}: {}",
            path,
            text.chars().take(500).collect::<String>()
        );
        Error::Json(e)
    })
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        self.get_json(&format!("/channels/{}", channel_id), &[]).await
    }

    async fn get_guild(&self, guild_id: &str) -> Result<Guild> {
        self.get_json(&format!("/guilds/{}", guild_id), &[]).await
    }

    async fn get_messages(&self, channel_id: &str, before: Option<&str>) -> Result<Vec<Message>> {
        let limit = PAGE_LIMIT.to_string();
        let mut query = vec![("limit", limit.as_str())];
        if let Some(before) = before {
            query.push(("before", before));
        }

        self.get_json(&format!("/channels/{}/messages", channel_id), &query)
            .await
    }
}

#[async_trait]
impl Fetch for DiscordClient {
    /// CDN attachments are public; the token is never sent to the CDN.
    async fn fetch(&self, url: &str) -> Result<RemoteFile> {
        let response = self.client.get(url).send().await?;

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(RemoteFile {
            status: response.status().as_u16(),
            etag,
            content_length: response.content_length(),
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(Error::from))
                .boxed(),
        })
    }
}
