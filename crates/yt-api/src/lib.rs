pub mod resource;

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

pub use resource::{ResourceError, build_resource};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("YouTube API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("YouTube API returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("YouTube API response missing '{0}'")]
    MissingField(&'static str),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// One playlist row from a list call.
#[derive(Debug, Clone)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
}

/// Thin client over the YouTube Data API v3 endpoints used by the transfer.
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl YouTubeClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    /// Client against a non-default API address (tests, local stubs).
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    async fn insert(
        &self,
        endpoint: &'static str,
        part: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/youtube/v3/{}?part={}", self.base_url, endpoint, part);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint,
                status,
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Create a new playlist and return its id.
    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: &str,
    ) -> Result<String, ApiError> {
        let properties = HashMap::from([
            ("snippet.title".to_string(), title.to_string()),
            ("snippet.description".to_string(), description.to_string()),
            ("snippet.tags[]".to_string(), String::new()),
            ("snippet.defaultLanguage".to_string(), String::new()),
            ("status.privacyStatus".to_string(), privacy.to_string()),
        ]);
        let body = build_resource(&properties)?;
        let response = self.insert("playlists", "snippet,status", &body).await?;

        response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ApiError::MissingField("id"))
    }

    /// Append one video to an existing playlist.
    pub async fn add_video_to_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), ApiError> {
        let properties = HashMap::from([
            ("snippet.playlistId".to_string(), playlist_id.to_string()),
            (
                "snippet.resourceId.kind".to_string(),
                "youtube#video".to_string(),
            ),
            ("snippet.resourceId.videoId".to_string(), video_id.to_string()),
            ("snippet.position".to_string(), String::new()),
        ]);
        let body = build_resource(&properties)?;
        self.insert("playlistItems", "snippet", &body).await?;
        Ok(())
    }

    /// Subscribe the authorized account to a channel.
    pub async fn subscribe(&self, channel_id: &str) -> Result<(), ApiError> {
        let properties = HashMap::from([
            (
                "snippet.resourceId.kind".to_string(),
                "youtube#channel".to_string(),
            ),
            (
                "snippet.resourceId.channelId".to_string(),
                channel_id.to_string(),
            ),
        ]);
        let body = build_resource(&properties)?;
        self.insert("subscriptions", "snippet", &body).await?;
        Ok(())
    }

    /// List playlists visible to the authorized account, optionally scoped
    /// to one channel.
    pub async fn list_playlists(
        &self,
        channel_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<PlaylistSummary>, ApiError> {
        let mut url = format!(
            "{}/youtube/v3/playlists?part=snippet,contentDetails",
            self.base_url
        );
        if let Some(channel_id) = channel_id {
            url.push_str(&format!("&channelId={channel_id}"));
        }
        if max_results > 0 {
            url.push_str(&format!("&maxResults={max_results}"));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: "playlists",
                status,
                body,
            });
        }

        let payload: Value = response.json().await?;
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .ok_or(ApiError::MissingField("items"))?;

        Ok(items
            .iter()
            .map(|item| PlaylistSummary {
                id: item
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                title: item
                    .pointer("/snippet/title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }
}
