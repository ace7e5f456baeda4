// HTTP handlers for the word resource

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse};
use crate::words::models::{
    CreateWord, ListParams, NewWord, RandomWord, UpdateWord, Word, WordMessage, WordPage,
};
use crate::AppState;

fn word_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Word id must be a valid UUID".to_string()))
}

fn word_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound {
        resource: "Word".to_string(),
        id: id.to_string(),
    }
}

/// Handler for GET /api/words/random
#[utoipa::path(
    get,
    path = "/api/words/random",
    responses(
        (status = 200, description = "A random word", body = RandomWord),
        (status = 404, description = "No words in the database", body = ErrorResponse)
    ),
    tag = "words"
)]
pub async fn random_word(State(state): State<AppState>) -> Result<Json<RandomWord>, ApiError> {
    let word = state.words.random().await?.ok_or_else(|| {
        tracing::debug!("Random word requested but the collection is empty");
        ApiError::EmptyCollection {
            resource: "words".to_string(),
        }
    })?;

    Ok(Json(word.into()))
}

/// Handler for GET /api/words
/// Supports category filtering and pagination
#[utoipa::path(
    get,
    path = "/api/words",
    params(ListParams),
    responses(
        (status = 200, description = "A page of words, newest first", body = WordPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "words"
)]
pub async fn list_words(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<WordPage>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    params.validate()?;
    tracing::debug!("Listing words with {:?}", params);

    let (words, total) = state
        .words
        .list(params.category, params.limit, params.offset())
        .await?;

    Ok(Json(WordPage::new(words, total, &params)))
}

/// Handler for GET /api/words/:id
#[utoipa::path(
    get,
    path = "/api/words/{id}",
    params(("id" = Uuid, Path, description = "Word ID")),
    responses(
        (status = 200, description = "Word found", body = Word),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Word not found", body = ErrorResponse)
    ),
    tag = "words"
)]
pub async fn get_word(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Word>, ApiError> {
    let id = word_id(path)?;
    let word = state
        .words
        .find_by_id(id)
        .await?
        .ok_or_else(|| word_not_found(id))?;

    Ok(Json(word))
}

/// Handler for POST /api/words
#[utoipa::path(
    post,
    path = "/api/words",
    request_body = CreateWord,
    responses(
        (status = 201, description = "Word created", body = WordMessage),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Word already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "words"
)]
pub async fn create_word(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateWord>, JsonRejection>,
) -> Result<(StatusCode, Json<WordMessage>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate()?;

    let word = state.words.create(NewWord::from(payload)).await?;

    tracing::info!("User {} created word {} ({})", user.user_id, word.word, word.id);
    Ok((
        StatusCode::CREATED,
        Json(WordMessage {
            message: "Word created successfully".to_string(),
            word,
        }),
    ))
}

/// Handler for PUT /api/words/:id
#[utoipa::path(
    put,
    path = "/api/words/{id}",
    params(("id" = Uuid, Path, description = "Word ID")),
    request_body = UpdateWord,
    responses(
        (status = 200, description = "Word updated", body = WordMessage),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Word not found", body = ErrorResponse),
        (status = 409, description = "Word already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "words"
)]
pub async fn update_word(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateWord>, JsonRejection>,
) -> Result<Json<WordMessage>, ApiError> {
    let id = word_id(path)?;
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate()?;

    let word = state
        .words
        .update(id, payload.normalized())
        .await?
        .ok_or_else(|| word_not_found(id))?;

    tracing::info!("User {} updated word {}", user.user_id, id);
    Ok(Json(WordMessage {
        message: "Word updated successfully".to_string(),
        word,
    }))
}

/// Handler for DELETE /api/words/:id
#[utoipa::path(
    delete,
    path = "/api/words/{id}",
    params(("id" = Uuid, Path, description = "Word ID")),
    responses(
        (status = 200, description = "Word deleted", body = WordMessage),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Word not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "words"
)]
pub async fn delete_word(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<WordMessage>, ApiError> {
    let id = word_id(path)?;
    let word = state
        .words
        .delete(id)
        .await?
        .ok_or_else(|| word_not_found(id))?;

    tracing::info!("User {} deleted word {}", user.user_id, id);
    Ok(Json(WordMessage {
        message: "Word deleted successfully".to_string(),
        word,
    }))
}
