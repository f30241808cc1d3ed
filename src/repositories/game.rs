use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities::{game, game_genre, genre};
use crate::models::{Association, Game, GameChanges, Genre, NewGame};
use crate::ports::catalog::{GameRepository, RepositoryError, RepositoryResult};
use crate::repositories::{
    association::{self, Pivot},
    missing_row_as_not_found,
};

pub struct SqlGameRepository {
    db: Arc<Database>,
}

impl SqlGameRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Genres attached to a game, ordered by id.
pub(crate) async fn genres_of<C>(conn: &C, game_id: i64) -> Result<Vec<Genre>, DbErr>
where
    C: ConnectionTrait,
{
    let genres = genre::Entity::find()
        .join(JoinType::InnerJoin, genre::Relation::GameGenre.def())
        .filter(game_genre::Column::GameId.eq(game_id))
        .order_by_asc(genre::Column::Id)
        .all(conn)
        .await?;

    Ok(genres.into_iter().map(Genre::from).collect())
}

#[async_trait::async_trait]
impl GameRepository for SqlGameRepository {
    #[instrument(skip(self))]
    async fn list_games(&self) -> RepositoryResult<Vec<Game>> {
        let games = game::Entity::find()
            .order_by_asc(game::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(games.into_iter().map(Game::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_game(&self, id: i64) -> RepositoryResult<Option<Game>> {
        let game = game::Entity::find_by_id(id).one(&self.db.conn).await?;
        Ok(game.map(Game::from))
    }

    #[instrument(skip(self, game), fields(game_id = game.id))]
    async fn load_genres(&self, mut game: Game) -> RepositoryResult<Game> {
        game.genres = Association::Loaded(genres_of(&self.db.conn, game.id).await?);
        Ok(game)
    }

    #[instrument(skip(self))]
    async fn create_game(&self, input: NewGame) -> RepositoryResult<Game> {
        let model = game::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!("Game created: '{}' (ID: {})", model.name, model.id);
        Ok(Game::from(model))
    }

    #[instrument(skip(self, game), fields(game_id = game.id))]
    async fn update_game(&self, game: &Game, changes: GameChanges) -> RepositoryResult<Game> {
        let mut active = game::ActiveModel {
            id: Unchanged(game.id),
            ..Default::default()
        };

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }

        let model = active
            .update(&self.db.conn)
            .await
            .map_err(missing_row_as_not_found)?;

        tracing::debug!("Game updated (ID: {})", model.id);
        Ok(Game::from(model))
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, id: i64) -> RepositoryResult<()> {
        let result = game::Entity::delete_by_id(id).exec(&self.db.conn).await?;

        tracing::debug!("Deleted {} game row(s) for ID {}", result.rows_affected, id);
        Ok(())
    }

    #[instrument(skip(self, game), fields(game_id = game.id))]
    async fn sync_genres(&self, game: &Game, genre_ids: &[i64]) -> RepositoryResult<Game> {
        // Dropping the transaction without commit rolls everything back
        let txn = self.db.conn.begin().await?;

        let claimed = association::claim_owner::<game::Entity, _>(
            &txn,
            game::Column::Id,
            game::Column::UpdatedAt,
            game.id,
        )
        .await?;
        if !claimed {
            return Err(RepositoryError::NotFound);
        }

        let model = game::Entity::find_by_id(game.id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let found =
            association::existing_ids::<genre::Entity, _>(&txn, genre::Column::Id, genre_ids)
                .await?;
        let missing = association::missing_ids(genre_ids, &found);
        if !missing.is_empty() {
            tracing::warn!("Refusing to sync unknown genre ids: {:?}", missing);
            return Err(RepositoryError::MissingReferences {
                entity: "genre",
                ids: missing,
            });
        }

        let changes = association::sync(&txn, Pivot::GameToGenres, model.id, genre_ids).await?;
        let genres = genres_of(&txn, model.id).await?;

        txn.commit().await?;

        tracing::info!(
            attached = ?changes.attached,
            detached = ?changes.detached,
            "Synced genres for game {}",
            model.id
        );

        let mut game = Game::from(model);
        game.genres = Association::Loaded(genres);
        Ok(game)
    }
}
