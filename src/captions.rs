use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::Segment;
use crate::error::TranscriptError;

/// Language used when neither the request nor the configuration names one
pub const FALLBACK_LANG: &str = "en";

/// Source of timed caption segments for a video
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Fetch caption segments for `video_id` in `lang`, in chronological order.
    async fn fetch_segments(&self, video_id: &str, lang: &str) -> eyre::Result<Vec<Segment>>;
}

/// Resolves the caption language and normalizes provider failures
#[derive(Clone)]
pub struct TranscriptRetriever {
    provider: Arc<dyn CaptionProvider>,
    default_lang: Option<String>,
}

impl TranscriptRetriever {
    pub fn new(provider: Arc<dyn CaptionProvider>, default_lang: Option<String>) -> Self {
        Self {
            provider,
            default_lang: non_empty(default_lang.as_deref()).map(str::to_string),
        }
    }

    /// Language actually requested from the provider
    pub fn effective_lang<'a>(&'a self, lang: Option<&'a str>) -> &'a str {
        non_empty(lang)
            .or(self.default_lang.as_deref())
            .unwrap_or(FALLBACK_LANG)
    }

    /// Fetch segments once; any provider failure becomes `Unavailable`.
    pub async fn fetch(&self, video_id: &str, lang: Option<&str>) -> Result<Vec<Segment>, TranscriptError> {
        let lang = self.effective_lang(lang);
        debug!("Fetching captions for {video_id} (lang={lang})");

        match self.provider.fetch_segments(video_id, lang).await {
            Ok(segments) => {
                debug!("Fetched {} segments for {video_id}", segments.len());
                Ok(segments)
            }
            Err(e) => {
                warn!("Caption retrieval failed for {video_id}: {e:#}");
                Err(TranscriptError::Unavailable(format!("{e:#}")))
            }
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
