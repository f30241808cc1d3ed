use sea_orm::DbErr;

use crate::models::{Game, GameChanges, Genre, GenreChanges, NewGame, NewGenre};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,
    /// An association sync named ids that have no row in the target table.
    #[error("Unknown {entity} ids: {ids:?}")]
    MissingReferences { entity: &'static str, ids: Vec<i64> },
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Port trait over game persistence.
///
/// Implementations live in `repositories::game` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GameRepository: Send + Sync {
    async fn list_games(&self) -> RepositoryResult<Vec<Game>>;

    async fn find_game(&self, id: i64) -> RepositoryResult<Option<Game>>;

    /// Returns the game with its genres eagerly loaded.
    async fn load_genres(&self, game: Game) -> RepositoryResult<Game>;

    async fn create_game(&self, input: NewGame) -> RepositoryResult<Game>;

    async fn update_game(&self, game: &Game, changes: GameChanges) -> RepositoryResult<Game>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_game(&self, id: i64) -> RepositoryResult<()>;

    /// Replaces the game's genres with exactly `genre_ids`, atomically.
    async fn sync_genres(&self, game: &Game, genre_ids: &[i64]) -> RepositoryResult<Game>;
}

/// Port trait over genre persistence.
///
/// Implementations live in `repositories::genre` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenreRepository: Send + Sync {
    async fn list_genres(&self) -> RepositoryResult<Vec<Genre>>;

    async fn find_genre(&self, id: i64) -> RepositoryResult<Option<Genre>>;

    async fn load_games(&self, genre: Genre) -> RepositoryResult<Genre>;

    async fn create_genre(&self, input: NewGenre) -> RepositoryResult<Genre>;

    async fn update_genre(&self, genre: &Genre, changes: GenreChanges) -> RepositoryResult<Genre>;

    async fn delete_genre(&self, id: i64) -> RepositoryResult<()>;

    async fn sync_games(&self, genre: &Genre, game_ids: &[i64]) -> RepositoryResult<Genre>;
}
