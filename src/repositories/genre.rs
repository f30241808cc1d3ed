use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities::{game, game_genre, genre};
use crate::models::{Association, Game, Genre, GenreChanges, NewGenre};
use crate::ports::catalog::{GenreRepository, RepositoryError, RepositoryResult};
use crate::repositories::{
    association::{self, Pivot},
    missing_row_as_not_found,
};

pub struct SqlGenreRepository {
    db: Arc<Database>,
}

impl SqlGenreRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Games attached to a genre, ordered by id.
pub(crate) async fn games_of<C>(conn: &C, genre_id: i64) -> Result<Vec<Game>, DbErr>
where
    C: ConnectionTrait,
{
    let games = game::Entity::find()
        .join(JoinType::InnerJoin, game::Relation::GameGenre.def())
        .filter(game_genre::Column::GenreId.eq(genre_id))
        .order_by_asc(game::Column::Id)
        .all(conn)
        .await?;

    Ok(games.into_iter().map(Game::from).collect())
}

#[async_trait::async_trait]
impl GenreRepository for SqlGenreRepository {
    #[instrument(skip(self))]
    async fn list_genres(&self) -> RepositoryResult<Vec<Genre>> {
        let genres = genre::Entity::find()
            .order_by_asc(genre::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(genres.into_iter().map(Genre::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_genre(&self, id: i64) -> RepositoryResult<Option<Genre>> {
        let genre = genre::Entity::find_by_id(id).one(&self.db.conn).await?;
        Ok(genre.map(Genre::from))
    }

    #[instrument(skip(self, genre), fields(genre_id = genre.id))]
    async fn load_games(&self, mut genre: Genre) -> RepositoryResult<Genre> {
        genre.games = Association::Loaded(games_of(&self.db.conn, genre.id).await?);
        Ok(genre)
    }

    #[instrument(skip(self))]
    async fn create_genre(&self, input: NewGenre) -> RepositoryResult<Genre> {
        let model = genre::ActiveModel {
            title: Set(input.title),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!("Genre created: '{}' (ID: {})", model.title, model.id);
        Ok(Genre::from(model))
    }

    #[instrument(skip(self, genre), fields(genre_id = genre.id))]
    async fn update_genre(&self, genre: &Genre, changes: GenreChanges) -> RepositoryResult<Genre> {
        let mut active = genre::ActiveModel {
            id: Unchanged(genre.id),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            active.title = Set(title);
        }

        let model = active
            .update(&self.db.conn)
            .await
            .map_err(missing_row_as_not_found)?;

        tracing::debug!("Genre updated (ID: {})", model.id);
        Ok(Genre::from(model))
    }

    #[instrument(skip(self))]
    async fn delete_genre(&self, id: i64) -> RepositoryResult<()> {
        let result = genre::Entity::delete_by_id(id).exec(&self.db.conn).await?;

        tracing::debug!("Deleted {} genre row(s) for ID {}", result.rows_affected, id);
        Ok(())
    }

    #[instrument(skip(self, genre), fields(genre_id = genre.id))]
    async fn sync_games(&self, genre: &Genre, game_ids: &[i64]) -> RepositoryResult<Genre> {
        let txn = self.db.conn.begin().await?;

        let claimed = association::claim_owner::<genre::Entity, _>(
            &txn,
            genre::Column::Id,
            genre::Column::UpdatedAt,
            genre.id,
        )
        .await?;
        if !claimed {
            return Err(RepositoryError::NotFound);
        }

        let model = genre::Entity::find_by_id(genre.id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let found =
            association::existing_ids::<game::Entity, _>(&txn, game::Column::Id, game_ids).await?;
        let missing = association::missing_ids(game_ids, &found);
        if !missing.is_empty() {
            tracing::warn!("Refusing to sync unknown game ids: {:?}", missing);
            return Err(RepositoryError::MissingReferences {
                entity: "game",
                ids: missing,
            });
        }

        let changes = association::sync(&txn, Pivot::GenreToGames, model.id, game_ids).await?;
        let games = games_of(&txn, model.id).await?;

        txn.commit().await?;

        tracing::info!(
            attached = ?changes.attached,
            detached = ?changes.detached,
            "Synced games for genre {}",
            model.id
        );

        let mut genre = Genre::from(model);
        genre.games = Association::Loaded(games);
        Ok(genre)
    }
}
