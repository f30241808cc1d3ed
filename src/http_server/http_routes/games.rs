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
    requests::{IncludeQuery, StoreGameRequest, SyncRequest, UpdateGameRequest},
    resources::GameResource,
    state::AppState,
};
use crate::models::Game;

async fn find_game(state: &AppState, id: i64) -> Result<Game, ApiError> {
    state.games.find_game(id).await?.ok_or(ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GameResource>>, ApiError> {
    let games = state.games.list_games().await?;
    Ok(Json(games.into_iter().map(GameResource::from).collect()))
}

#[instrument(skip(state, request))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<StoreGameRequest>,
) -> Result<(StatusCode, Json<GameResource>), ApiError> {
    let input = request.validated()?;
    let game = state.games.create_game(input).await?;

    Ok((StatusCode::CREATED, Json(GameResource::from(game))))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    Query(query): Query<IncludeQuery>,
) -> Result<Json<GameResource>, ApiError> {
    let mut game = find_game(&state, id).await?;
    if query.includes("genres") {
        game = state.games.load_genres(game).await?;
    }

    Ok(Json(GameResource::from(game)))
}

/// The record is resolved before the body is looked at, so a missing game
/// is a 404 even when the payload is also invalid.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    payload: Result<JsonBody<UpdateGameRequest>, ApiError>,
) -> Result<Json<GameResource>, ApiError> {
    let game = find_game(&state, id).await?;
    let JsonBody(request) = payload?;
    let changes = request.validated()?;

    let game = state.games.update_game(&game, changes).await?;
    Ok(Json(GameResource::from(game)))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<StatusCode, ApiError> {
    state.games.delete_game(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn add_genres(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    payload: Result<JsonBody<SyncRequest>, ApiError>,
) -> Result<Json<GameResource>, ApiError> {
    let game = find_game(&state, id).await?;
    let JsonBody(request) = payload?;
    let genre_ids = request.validated()?;

    let game = state.games.sync_genres(&game, &genre_ids).await?;
    Ok(Json(GameResource::from(game)))
}
