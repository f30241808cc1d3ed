use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::http_server::{
    error::ApiError,
    extract::{JsonBody, RecordId},
    requests::{IncludeQuery, StoreGenreRequest, SyncRequest, UpdateGenreRequest},
    resources::GenreResource,
    state::AppState,
};
use crate::models::Genre;

async fn find_genre(state: &AppState, id: i64) -> Result<Genre, ApiError> {
    state.genres.find_genre(id).await?.ok_or(ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GenreResource>>, ApiError> {
    let genres = state.genres.list_genres().await?;
    Ok(Json(genres.into_iter().map(GenreResource::from).collect()))
}

#[instrument(skip(state, request))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<StoreGenreRequest>,
) -> Result<(StatusCode, Json<GenreResource>), ApiError> {
    let input = request.validated()?;
    let genre = state.genres.create_genre(input).await?;

    Ok((StatusCode::CREATED, Json(GenreResource::from(genre))))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    Query(query): Query<IncludeQuery>,
) -> Result<Json<GenreResource>, ApiError> {
    let mut genre = find_genre(&state, id).await?;
    if query.includes("games") {
        genre = state.genres.load_games(genre).await?;
    }

    Ok(Json(GenreResource::from(genre)))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    payload: Result<JsonBody<UpdateGenreRequest>, ApiError>,
) -> Result<Json<GenreResource>, ApiError> {
    let genre = find_genre(&state, id).await?;
    let JsonBody(request) = payload?;
    let changes = request.validated()?;

    let genre = state.genres.update_genre(&genre, changes).await?;
    Ok(Json(GenreResource::from(genre)))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<StatusCode, ApiError> {
    state.genres.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn add_games(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    payload: Result<JsonBody<SyncRequest>, ApiError>,
) -> Result<Json<GenreResource>, ApiError> {
    let genre = find_genre(&state, id).await?;
    let JsonBody(request) = payload?;
    let game_ids = request.validated()?;

    let genre = state.genres.sync_games(&genre, &game_ids).await?;
    Ok(Json(GenreResource::from(genre)))
}
