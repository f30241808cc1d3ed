use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use tower::ServiceExt;

use crate::database::Database;
use crate::entities;

pub async fn test_db() -> Arc<Database> {
    Arc::new(
        Database::in_memory()
            .await
            .unwrap_or_else(|e| panic!("Failed to set up test database: {e:?}")),
    )
}

/// A file-backed database with the full connection pool, for tests that need
/// more than one connection.
pub async fn file_db(dir: &tempfile::TempDir) -> Arc<Database> {
    Arc::new(
        Database::open(&dir.path().join("catalog.db"))
            .await
            .unwrap_or_else(|e| panic!("Failed to set up file database: {e:?}")),
    )
}

/// Genre ids currently attached to a game, read straight from the join table.
pub async fn attached_genre_ids(db: &Database, game_id: i64) -> Vec<i64> {
    let mut ids: Vec<i64> = entities::game_genre::Entity::find()
        .filter(entities::game_genre::Column::GameId.eq(game_id))
        .all(&db.conn)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.genre_id)
        .collect();
    ids.sort_unstable();
    ids
}

pub async fn join_row_count(db: &Database) -> u64 {
    entities::game_genre::Entity::find()
        .count(&db.conn)
        .await
        .unwrap()
}

/// Send a request through the router; returns the status and the JSON body,
/// if any.
pub async fn send_json(
    router: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&body).unwrap())
        }
        None => Body::empty(),
    };

    let response = router.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    if bytes.is_empty() {
        (status, None)
    } else {
        (status, Some(serde_json::from_slice(&bytes).unwrap()))
    }
}
