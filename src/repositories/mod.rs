use sea_orm::DbErr;

use crate::ports::catalog::RepositoryError;

mod association;
pub mod game;
pub mod genre;

pub use game::SqlGameRepository;
pub use genre::SqlGenreRepository;

/// `update` reports a vanished row as either of these depending on the backend
fn missing_row_as_not_found(err: DbErr) -> RepositoryError {
    match err {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => RepositoryError::NotFound,
        other => RepositoryError::Database(other),
    }
}
