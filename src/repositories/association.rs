use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::Expr,
};

use crate::entities::game_genre;

/// Ids per `IN (...)` list, kept well under SQLite's bound-parameter limit.
const ID_CHUNK: usize = 500;

/// Which side of `game_genre` owns the sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pivot {
    GameToGenres,
    GenreToGames,
}

impl Pivot {
    fn owner_column(self) -> game_genre::Column {
        match self {
            Pivot::GameToGenres => game_genre::Column::GameId,
            Pivot::GenreToGames => game_genre::Column::GenreId,
        }
    }

    fn target_column(self) -> game_genre::Column {
        match self {
            Pivot::GameToGenres => game_genre::Column::GenreId,
            Pivot::GenreToGames => game_genre::Column::GameId,
        }
    }

    fn row(self, owner_id: i64, target_id: i64) -> game_genre::ActiveModel {
        let (game_id, genre_id) = match self {
            Pivot::GameToGenres => (owner_id, target_id),
            Pivot::GenreToGames => (target_id, owner_id),
        };

        game_genre::ActiveModel {
            game_id: Set(game_id),
            genre_id: Set(genre_id),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SyncChanges {
    pub attached: Vec<i64>,
    pub detached: Vec<i64>,
}

/// Diff the current join set against the target set.
pub(crate) fn plan(current: &[i64], target: &[i64]) -> SyncChanges {
    let current: BTreeSet<i64> = current.iter().copied().collect();
    let target: BTreeSet<i64> = target.iter().copied().collect();

    SyncChanges {
        attached: target.difference(&current).copied().collect(),
        detached: current.difference(&target).copied().collect(),
    }
}

/// Requested ids with no matching row, in request order, without repeats.
pub(crate) fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    let found: BTreeSet<i64> = found.iter().copied().collect();
    let mut seen = BTreeSet::new();

    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id) && seen.insert(*id))
        .collect()
}

/// Rewrite `touch` with its own value on the owner row, taking SQLite's write
/// lock. Must be the first statement of a sync transaction: a transaction that
/// reads first cannot wait for the lock later, it fails with `SQLITE_BUSY`.
/// Returns false when the owner row is gone.
pub(crate) async fn claim_owner<E, C>(
    conn: &C,
    id_column: E::Column,
    touch: E::Column,
    owner_id: i64,
) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(touch, Expr::col(touch))
        .filter(id_column.eq(owner_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Ids from `ids` that exist in `column`'s table.
pub(crate) async fn existing_ids<E, C>(
    conn: &C,
    column: E::Column,
    ids: &[i64],
) -> Result<Vec<i64>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut found = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK) {
        let rows: Vec<i64> = E::find()
            .select_only()
            .column(column)
            .filter(column.is_in(chunk.iter().copied()))
            .into_tuple::<i64>()
            .all(conn)
            .await?;
        found.extend(rows);
    }

    Ok(found)
}

/// Make the owner's join rows match `target_ids` exactly. Callers run this
/// inside a transaction, after [`claim_owner`] and after checking that every
/// target exists.
pub(crate) async fn sync<C>(
    conn: &C,
    pivot: Pivot,
    owner_id: i64,
    target_ids: &[i64],
) -> Result<SyncChanges, DbErr>
where
    C: ConnectionTrait,
{
    let current: Vec<i64> = game_genre::Entity::find()
        .select_only()
        .column(pivot.target_column())
        .filter(pivot.owner_column().eq(owner_id))
        .into_tuple::<i64>()
        .all(conn)
        .await?;

    let changes = plan(&current, target_ids);

    for chunk in changes.detached.chunks(ID_CHUNK) {
        game_genre::Entity::delete_many()
            .filter(pivot.owner_column().eq(owner_id))
            .filter(pivot.target_column().is_in(chunk.iter().copied()))
            .exec(conn)
            .await?;
    }

    // Two bound parameters per row
    for chunk in changes.attached.chunks(ID_CHUNK / 2) {
        let rows = chunk
            .iter()
            .map(|target_id| pivot.row(owner_id, *target_id));

        game_genre::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }

    Ok(changes)
}
