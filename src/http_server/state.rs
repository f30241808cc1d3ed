use std::sync::Arc;

use crate::database::Database;
use crate::ports::catalog::{GameRepository, GenreRepository};
use crate::repositories::{SqlGameRepository, SqlGenreRepository};

pub struct AppState {
    pub games: Arc<dyn GameRepository>,
    pub genres: Arc<dyn GenreRepository>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            games: Arc::new(SqlGameRepository::new(db.clone())),
            genres: Arc::new(SqlGenreRepository::new(db)),
        }
    }
}
