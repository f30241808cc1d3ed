use chrono::{DateTime, Utc};

use crate::entities;

/// An association that may or may not have been fetched alongside its owner.
///
/// Serializers only emit the association when it is `Loaded`; an empty
/// `Loaded(vec![])` still renders as `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association<T> {
    Unloaded,
    Loaded(Vec<T>),
}

impl<T> Default for Association<T> {
    fn default() -> Self {
        Association::Unloaded
    }
}

impl<T> Association<T> {
    #[cfg(test)]
    pub fn loaded(&self) -> Option<&[T]> {
        match self {
            Association::Loaded(items) => Some(items),
            Association::Unloaded => None,
        }
    }

    pub fn into_loaded(self) -> Option<Vec<T>> {
        match self {
            Association::Loaded(items) => Some(items),
            Association::Unloaded => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub genres: Association<Genre>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub games: Association<Game>,
}

/// Validated input for inserting a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update of a game. `None` leaves the column untouched;
/// `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGenre {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreChanges {
    pub title: Option<String>,
}

impl From<entities::game::Model> for Game {
    fn from(model: entities::game::Model) -> Self {
        Game {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            genres: Association::Unloaded,
        }
    }
}

impl From<entities::genre::Model> for Genre {
    fn from(model: entities::genre::Model) -> Self {
        Genre {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
            games: Association::Unloaded,
        }
    }
}
