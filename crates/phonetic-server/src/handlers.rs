use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use phonetic_engine::{Annotator, DictionarySource, render_inline};
use phonetic_types::Record;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Secondary dictionary consulted for unknown characters, if configured.
pub type FallbackSource = Option<DictionarySource>;

/// The annotator mutates its index on lookups that fetch, so every request
/// takes the lock.
pub type SharedAnnotator = Arc<Mutex<Annotator<FallbackSource>>>;

#[derive(Clone)]
pub struct AppState {
    pub annotator: SharedAnnotator,
    pub max_text_chars: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct AnnotateQuery {
    pub text: String,
}

#[derive(Deserialize)]
pub struct CharacterQuery {
    pub character: String,
}

#[derive(Deserialize)]
pub struct PronunciationQuery {
    pub pronunciation: String,
}

#[derive(Serialize)]
struct Slot {
    character: char,
    pronunciation: Option<String>,
}

#[derive(Serialize)]
pub struct AnnotateResponse {
    text: String,
    slots: Vec<Slot>,
    inline: String,
}

#[derive(Serialize)]
pub struct PronunciationsResponse {
    character: String,
    items: Vec<RecordView>,
}

#[derive(Serialize)]
pub struct CharactersResponse {
    pronunciation: String,
    characters: Vec<String>,
    items: Vec<RecordView>,
}

#[derive(Serialize)]
struct RecordView {
    character: String,
    pronunciation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_cases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    variant_reading: bool,
    cantonese_specific: bool,
    proper_noun_reading: bool,
    interchangeable_character: bool,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            character: record.character.clone(),
            pronunciation: record.pronunciation.clone(),
            use_cases: record.use_cases.clone(),
            explanation: record.explanation.clone(),
            variant_reading: record.flags.variant_reading,
            cantonese_specific: record.flags.cantonese_specific,
            proper_noun_reading: record.flags.proper_noun_reading,
            interchangeable_character: record.flags.interchangeable_character,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/annotate", get(annotate))
        .route("/v1/pronunciations", get(pronunciations))
        .route("/v1/characters", get(characters))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn annotate(
    State(state): State<AppState>,
    Query(params): Query<AnnotateQuery>,
) -> Result<Response, ApiError> {
    let text = params.text;
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    let len = text.chars().count();
    if len > state.max_text_chars {
        return Err(ApiError::bad_request(format!(
            "text must be at most {} characters, got {len}",
            state.max_text_chars
        )));
    }

    let (text, slots) = with_annotator(&state, move |annotator| {
        let slots = annotator.annotate(&text);
        (text, slots)
    })
    .await?;

    let inline = render_inline(&text, &slots);
    let slots = text
        .chars()
        .zip(slots)
        .map(|(character, pronunciation)| Slot {
            character,
            pronunciation,
        })
        .collect();
    let response = AnnotateResponse {
        text,
        slots,
        inline,
    };
    Ok(cached(Json(response), state.disable_cache))
}

async fn pronunciations(
    State(state): State<AppState>,
    Query(params): Query<CharacterQuery>,
) -> Result<Response, ApiError> {
    let character = params.character.trim().to_string();
    if character.chars().count() != 1 {
        return Err(ApiError::bad_request("character must be a single character"));
    }

    let key = character.clone();
    let items = with_annotator(&state, move |annotator| {
        annotator
            .lookup_by_character(&key)
            .map(|records| records.iter().map(|r| RecordView::from(&**r)).collect::<Vec<_>>())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no pronunciations for {character}")))?;

    let response = PronunciationsResponse { character, items };
    Ok(cached(Json(response), state.disable_cache))
}

async fn characters(
    State(state): State<AppState>,
    Query(params): Query<PronunciationQuery>,
) -> Result<Response, ApiError> {
    let pronunciation = params.pronunciation.trim().to_string();
    if pronunciation.is_empty() {
        return Err(ApiError::bad_request("pronunciation is required"));
    }

    let key = pronunciation.clone();
    let items = with_annotator(&state, move |annotator| {
        annotator
            .lookup_by_pronunciation(&key)
            .map(|records| records.iter().map(|r| RecordView::from(&**r)).collect::<Vec<_>>())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no characters read as {pronunciation}")))?;

    let characters = items.iter().map(|item| item.character.clone()).collect();
    let response = CharactersResponse {
        pronunciation,
        characters,
        items,
    };
    Ok(cached(Json(response), state.disable_cache))
}

/// Run `f` against the locked annotator on the blocking pool; annotation may
/// wait on the fallback source or on a file append.
async fn with_annotator<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Annotator<FallbackSource>) -> T + Send + 'static,
    T: Send + 'static,
{
    let annotator = Arc::clone(&state.annotator);
    tokio::task::spawn_blocking(move || {
        let mut guard = annotator.lock().map_err(|_| {
            error!("annotator lock poisoned");
            ApiError::Internal
        })?;
        Ok::<T, ApiError>(f(&mut *guard))
    })
    .await
    .map_err(|err| {
        error!("annotator task failed: {err}");
        ApiError::Internal
    })?
}

fn cached<T: IntoResponse>(body: T, disable_cache: bool) -> Response {
    if disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::NotFound(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
