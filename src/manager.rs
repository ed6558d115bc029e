use std::sync::Arc;

use crate::Segment;
use crate::captions::{CaptionProvider, TranscriptRetriever};
use crate::error::{MetadataError, TranscriptError};
use crate::metadata::{MetadataClient, VideoRecord};
use crate::youtube::InnerTubeCaptions;

/// Read-only handle to the two upstream services, shared by every request
#[derive(Clone)]
pub struct VideoManager {
    transcripts: TranscriptRetriever,
    metadata: MetadataClient,
}

impl VideoManager {
    pub fn new(transcripts: TranscriptRetriever, metadata: MetadataClient) -> Self {
        Self { transcripts, metadata }
    }

    /// Production wiring: InnerTube captions plus the Data API, over one HTTP client.
    pub fn youtube(
        client: reqwest::Client,
        api_key: impl Into<String>,
        default_lang: Option<String>,
        metadata_base_url: &str,
    ) -> Self {
        let provider: Arc<dyn CaptionProvider> = Arc::new(InnerTubeCaptions::new(client.clone()));
        Self::new(
            TranscriptRetriever::new(provider, default_lang),
            MetadataClient::with_base_url(client, api_key, metadata_base_url),
        )
    }

    pub async fn get_transcript(&self, video_id: &str, lang: Option<&str>) -> Result<Vec<Segment>, TranscriptError> {
        self.transcripts.fetch(video_id, lang).await
    }

    pub async fn get_video(&self, video_id: &str, parts: &[&str]) -> Result<VideoRecord, MetadataError> {
        self.metadata.get_video(video_id, parts).await
    }
}
