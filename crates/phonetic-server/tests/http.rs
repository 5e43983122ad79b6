use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use phonetic_dict::{Dictionary, DictionaryStore};
use phonetic_engine::{Annotator, DictionarySource};
use phonetic_server::{AppState, router};
use phonetic_types::Record;
use tower::util::ServiceExt;

const DATA: &str = "X\tp1\tfoo，bar\nX\tp2\t\nY\tq1\t\n行\thang4\t行路\n行\thong4\t銀行\n";

fn make_state(dir: &Path) -> AppState {
    let path = dir.join("data.txt");
    std::fs::write(&path, DATA).unwrap();
    let store = DictionaryStore::new(&path);
    let dictionary = store.load().unwrap();
    let fallback = DictionarySource::new(Dictionary::from_records([Record::new("冇", "mou5")]));
    AppState {
        annotator: Arc::new(Mutex::new(Annotator::new(
            dictionary,
            Some(store),
            Some(fallback),
        ))),
        max_text_chars: 32,
        disable_cache: false,
    }
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(make_state(dir.path()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn annotate_endpoint_uses_context() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get_json(
        make_state(dir.path()),
        "/v1/annotate?text=%E9%8A%80%E8%A1%8C%20bar%20X",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "銀行 bar X");
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0]["character"], "銀");
    assert!(slots[0]["pronunciation"].is_null());
    assert_eq!(slots[1]["pronunciation"], "hong4");
    assert_eq!(slots[7]["pronunciation"], "p1");
    assert_eq!(body["inline"], "銀行(hong4) bar X(p1)");
}

#[tokio::test]
async fn annotate_endpoint_learns_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(dir.path());
    let (status, body) = get_json(state.clone(), "/v1/annotate?text=%E5%86%87").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"][0]["pronunciation"], "mou5");

    let (status, body) = get_json(state, "/v1/pronunciations?character=%E5%86%87").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["pronunciation"], "mou5");

    let persisted = std::fs::read_to_string(dir.path().join("data.txt")).unwrap();
    assert!(persisted.ends_with("冇\tmou5\t\n"));
}

#[tokio::test]
async fn annotate_endpoint_rejects_empty_and_long_text() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(dir.path());
    let (status, body) = get_json(state.clone(), "/v1/annotate?text=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("required")
    );

    let long = "a".repeat(33);
    let (status, body) = get_json(state, &format!("/v1/annotate?text={long}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("at most")
    );
}

#[tokio::test]
async fn pronunciations_endpoint_lists_readings_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get_json(make_state(dir.path()), "/v1/pronunciations?character=X").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["pronunciation"], "p1");
    assert_eq!(items[0]["use_cases"][1], "bar");
    assert_eq!(items[1]["pronunciation"], "p2");
    assert!(items[1].get("use_cases").is_none());
}

#[tokio::test]
async fn pronunciations_endpoint_validates_input() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(dir.path());
    let (status, _) = get_json(state.clone(), "/v1/pronunciations?character=XY").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(state, "/v1/pronunciations?character=Q").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("no pronunciations")
    );
}

#[tokio::test]
async fn characters_endpoint_reverse_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(dir.path());
    let (status, body) = get_json(state.clone(), "/v1/characters?pronunciation=p2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["characters"], serde_json::json!(["X"]));

    let (status, _) = get_json(state, "/v1/characters?pronunciation=zz9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
