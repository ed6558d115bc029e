use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use tubescript::Segment;
use tubescript::captions::{CaptionProvider, TranscriptRetriever};
use tubescript::manager::VideoManager;
use tubescript::metadata::MetadataClient;
use tubescript::server::router;

/// Canned provider that records every (video_id, lang) it is asked for
#[derive(Default)]
struct StubProvider {
    texts: Vec<&'static str>,
    failure: Option<&'static str>,
    panic: bool,
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl CaptionProvider for StubProvider {
    async fn fetch_segments(&self, video_id: &str, lang: &str) -> eyre::Result<Vec<Segment>> {
        self.calls.lock().unwrap().push((video_id.to_string(), lang.to_string()));
        if self.panic {
            panic!("provider exploded");
        }
        if let Some(msg) = self.failure {
            eyre::bail!(msg);
        }
        Ok(self
            .texts
            .iter()
            .enumerate()
            .map(|(i, t)| Segment::new(*t, i as f64, 1.0))
            .collect())
    }
}

fn app_with(provider: Arc<StubProvider>, default_lang: Option<&str>) -> Router {
    // base url points nowhere; the transcript routes never touch metadata
    let metadata = MetadataClient::with_base_url(reqwest::Client::new(), "test-key", "http://127.0.0.1:9");
    let retriever = TranscriptRetriever::new(provider, default_lang.map(str::to_string));
    router(Arc::new(VideoManager::new(retriever, metadata)))
}

fn rick_roll() -> Arc<StubProvider> {
    Arc::new(StubProvider {
        texts: vec!["Never", "gonna", "give"],
        ..Default::default()
    })
}

fn failing(msg: &'static str) -> Arc<StubProvider> {
    Arc::new(StubProvider {
        failure: Some(msg),
        ..Default::default()
    })
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn url_missing_is_bad_request() {
    let (status, json) = post_json(app_with(rick_roll(), None), "/api/transcript", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "YouTube URL is required" }));
}

#[tokio::test]
async fn url_empty_string_is_missing() {
    let (status, json) = post_json(app_with(rick_roll(), None), "/api/transcript", r#"{"url":""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "YouTube URL is required");
}

#[tokio::test]
async fn empty_body_reads_as_empty_object() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcript")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app_with(rick_roll(), None), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "YouTube URL is required");
}

#[tokio::test]
async fn invalid_url_is_bad_request() {
    let provider = rick_roll();
    let (status, json) = post_json(
        app_with(provider.clone(), None),
        "/api/transcript",
        r#"{"url":"not a youtube url"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "Invalid YouTube URL" }));
    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_body() {
    let (status, json) = post_json(app_with(rick_roll(), None), "/api/transcript", "{url:").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid request body");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn url_success_returns_assembled_transcript() {
    let provider = rick_roll();
    let (status, json) = post_json(
        app_with(provider.clone(), None),
        "/api/transcript",
        r#"{"url":"https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({ "videoId": "dQw4w9WgXcQ", "transcript": "Never gonna give" })
    );
    assert_eq!(
        *provider.calls.lock().unwrap(),
        vec![("dQw4w9WgXcQ".to_string(), "en".to_string())]
    );
}

#[tokio::test]
async fn url_request_lang_overrides_default() {
    let provider = rick_roll();
    let (status, _) = post_json(
        app_with(provider.clone(), Some("de")),
        "/api/transcript",
        r#"{"url":"https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1","lang":"es"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls.lock().unwrap()[0].1, "es");
}

#[tokio::test]
async fn configured_default_lang_is_used() {
    let provider = rick_roll();
    let (status, _) = post_json(
        app_with(provider.clone(), Some("de")),
        "/api/transcript/id",
        r#"{"videoId":"dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls.lock().unwrap()[0].1, "de");
}

#[tokio::test]
async fn url_retrieval_failure_is_server_error() {
    let (status, json) = post_json(
        app_with(failing("no captions available for video dQw4w9WgXcQ"), None),
        "/api/transcript",
        r#"{"url":"https://www.youtube.com/embed/dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to retrieve transcript");
    assert_eq!(
        json["message"],
        "Failed to retrieve transcript: no captions available for video dQw4w9WgXcQ"
    );
}

#[tokio::test]
async fn id_missing_is_bad_request() {
    let (status, json) = post_json(app_with(rick_roll(), None), "/api/transcript/id", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "YouTube video ID is required" }));
}

#[tokio::test]
async fn id_success_returns_assembled_transcript() {
    let (status, json) = post_json(
        app_with(rick_roll(), None),
        "/api/transcript/id",
        r#"{"videoId":"dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["videoId"], "dQw4w9WgXcQ");
    assert_eq!(json["transcript"], "Never gonna give");
}

#[tokio::test]
async fn id_is_not_shape_checked() {
    let provider = rick_roll();
    let (status, json) = post_json(
        app_with(provider.clone(), None),
        "/api/transcript/id",
        r#"{"videoId":"short"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["videoId"], "short");
    assert_eq!(provider.calls.lock().unwrap()[0].0, "short");
}

#[tokio::test]
async fn id_retrieval_failure_is_server_error() {
    let (status, json) = post_json(
        app_with(failing("network unreachable"), None),
        "/api/transcript/id",
        r#"{"videoId":"dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to retrieve transcript");
    assert!(json["message"].as_str().unwrap().contains("network unreachable"));
}

#[tokio::test]
async fn empty_caption_list_gives_empty_transcript() {
    let provider = Arc::new(StubProvider::default());
    let (status, json) = post_json(
        app_with(provider, None),
        "/api/transcript/id",
        r#"{"videoId":"dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transcript"], "");
}

#[tokio::test]
async fn handler_panic_is_structured_server_error() {
    let provider = Arc::new(StubProvider {
        panic: true,
        ..Default::default()
    });
    let (status, json) = post_json(
        app_with(provider, None),
        "/api/transcript/id",
        r#"{"videoId":"dQw4w9WgXcQ"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to retrieve transcript");
    assert_eq!(json["message"], "provider exploded");
}

#[tokio::test]
async fn health_is_ok_even_when_upstream_fails() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app_with(failing("everything is down"), None), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app_with(rick_roll(), None).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn oversized_body_is_structured_bad_request() {
    let padding = "x".repeat(3 * 1024 * 1024);
    let body = format!(r#"{{"url":"https://youtu.be/dQw4w9WgXcQ","pad":"{padding}"}}"#);
    let provider = rick_roll();
    let (status, json) = post_json(app_with(provider.clone(), None), "/api/transcript", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid request body");
    assert!(json["message"].is_string());
    assert!(provider.calls.lock().unwrap().is_empty());
}
