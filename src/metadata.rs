use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

pub const DEFAULT_METADATA_BASE_URL: &str = "https://www.googleapis.com";

/// Parts requested when the caller does not name any
pub const DEFAULT_PARTS: &[&str] = &["snippet"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
}

/// One entry of a `videos.list` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    /// Any other requested parts (`contentDetails`, `statistics`, ...)
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoRecord>,
}

/// YouTube Data API v3 client for video metadata
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MetadataClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_METADATA_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Look up a single video. An empty `parts` slice means `snippet`.
    pub async fn get_video(&self, video_id: &str, parts: &[&str]) -> Result<VideoRecord, MetadataError> {
        let parts = if parts.is_empty() { DEFAULT_PARTS } else { parts };
        let part = parts.join(",");
        let url = format!("{}/youtube/v3/videos", self.base_url);
        debug!("Looking up video {video_id} (parts={part})");

        let resp: VideoListResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", part.as_str()),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        first_item(resp)
    }
}

fn request_error(e: reqwest::Error) -> MetadataError {
    // drop the url so the api key never ends up in an error message
    MetadataError::Request(e.without_url().to_string())
}

fn first_item(resp: VideoListResponse) -> Result<VideoRecord, MetadataError> {
    resp.items.into_iter().next().ok_or(MetadataError::VideoNotFound)
}
