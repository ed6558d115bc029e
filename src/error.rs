use thiserror::Error;

/// Caption retrieval failed upstream
#[derive(Debug, Clone, Error)]
pub enum TranscriptError {
    #[error("Failed to retrieve transcript: {0}")]
    Unavailable(String),
}

/// Video metadata lookup errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("Video not found.")]
    VideoNotFound,

    #[error("Failed to retrieve video information: {0}")]
    Request(String),
}

/// Fatal startup configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("YOUTUBE_API_KEY environment variable is not set.")]
    MissingApiKey,
}
