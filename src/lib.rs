pub mod assemble;
pub mod captions;
pub mod config;
pub mod error;
pub mod manager;
pub mod metadata;
pub mod server;
pub mod video_id;
pub mod youtube;

use serde::{Deserialize, Serialize};

pub use video_id::{VideoId, extract_video_id};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Response body for a successful transcript request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResult {
    pub video_id: String,
    pub transcript: String,
}
