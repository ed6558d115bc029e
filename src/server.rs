use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

use crate::assemble::assemble;
use crate::error::TranscriptError;
use crate::manager::VideoManager;
use crate::{TranscriptResult, extract_video_id};

const RETRIEVAL_FAILED: &str = "Failed to retrieve transcript";

#[derive(Debug, Default, Deserialize)]
struct UrlRequest {
    url: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdRequest {
    video_id: Option<String>,
    lang: Option<String>,
}

/// Every failure a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("YouTube URL is required")]
    MissingUrl,

    #[error("YouTube video ID is required")]
    MissingVideoId,

    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingUrl | ApiError::MissingVideoId | ApiError::InvalidUrl => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string()))
            }
            ApiError::InvalidBody(ref msg) => (StatusCode::BAD_REQUEST, ErrorBody::with_message(self.to_string(), msg)),
            ApiError::Transcript(ref e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::with_message(RETRIEVAL_FAILED, e.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Build the application router around a shared video manager.
///
/// Hosts that embed the service (instead of running the binary's listener)
/// call this directly and serve the returned router themselves.
pub fn router(videos: Arc<VideoManager>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/transcript", post(transcript_by_url))
        .route("/api/transcript/id", post(transcript_by_id))
        .route("/health", get(health))
        .with_state(videos)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(middleware::from_fn(log_requests))
}

async fn transcript_by_url(
    State(videos): State<Arc<VideoManager>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TranscriptResult>, ApiError> {
    let body = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let req: UrlRequest = parse_body(&body)?;
    let url = non_empty(req.url).ok_or(ApiError::MissingUrl)?;
    let video_id = extract_video_id(&url).ok_or(ApiError::InvalidUrl)?;

    transcript_response(&videos, video_id.into_inner(), req.lang.as_deref()).await
}

async fn transcript_by_id(
    State(videos): State<Arc<VideoManager>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TranscriptResult>, ApiError> {
    let body = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let req: IdRequest = parse_body(&body)?;
    let video_id = non_empty(req.video_id).ok_or(ApiError::MissingVideoId)?;

    transcript_response(&videos, video_id, req.lang.as_deref()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcript_response(
    videos: &VideoManager,
    video_id: String,
    lang: Option<&str>,
) -> Result<Json<TranscriptResult>, ApiError> {
    let segments = videos.get_transcript(&video_id, lang).await?;
    let transcript = assemble(&segments);

    Ok(Json(TranscriptResult { video_id, transcript }))
}

/// An empty body reads as `{}`; anything else must be a JSON object.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    debug!("Received request body: {}", String::from_utf8_lossy(body));
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected error".to_string()
    };
    warn!("Handler panicked: {message}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_message(RETRIEVAL_FAILED, message)),
    )
        .into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!("{method} {path} -> {} ({:?})", response.status().as_u16(), started.elapsed());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_empty_is_default() {
        let req: UrlRequest = parse_body(b"").unwrap();
        assert!(req.url.is_none());
        let req: IdRequest = parse_body(b"  \n").unwrap();
        assert!(req.video_id.is_none());
    }

    #[test]
    fn test_parse_body_camel_case_video_id() {
        let req: IdRequest = parse_body(br#"{"videoId":"dQw4w9WgXcQ","lang":"de"}"#).unwrap();
        assert_eq!(req.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(req.lang.as_deref(), Some("de"));
    }

    #[test]
    fn test_parse_body_null_fields() {
        let req: UrlRequest = parse_body(br#"{"url":null}"#).unwrap();
        assert!(req.url.is_none());
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        let err = parse_body::<UrlRequest>(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
        let err = parse_body::<UrlRequest>(br#"{"url": 42}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[test]
    fn test_panic_payload_message() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = panic_response(Box::new(String::from("kaboom")));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::MissingUrl.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidUrl.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidBody("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Transcript(TranscriptError::Unavailable("x".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
