use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Game, Genre};

/// Wire shape of a game. `genres` is present only when it was loaded.
#[derive(Debug, Serialize)]
pub struct GameResource {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<GenreResource>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a genre. `games` is present only when it was loaded.
#[derive(Debug, Serialize)]
pub struct GenreResource {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<GameResource>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Game> for GameResource {
    fn from(game: Game) -> Self {
        GameResource {
            id: game.id,
            name: game.name,
            description: game.description,
            genres: game
                .genres
                .into_loaded()
                .map(|genres| genres.into_iter().map(GenreResource::from).collect()),
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

impl From<Genre> for GenreResource {
    fn from(genre: Genre) -> Self {
        GenreResource {
            id: genre.id,
            title: genre.title,
            games: genre
                .games
                .into_loaded()
                .map(|games| games.into_iter().map(GameResource::from).collect()),
            created_at: genre.created_at,
            updated_at: genre.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Association;
    use chrono::TimeZone;
    use serde_json::json;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 12, 11, 9, 25, 53).unwrap()
    }

    fn game(genres: Association<Genre>) -> Game {
        Game {
            id: 1,
            name: "God of war".into(),
            description: None,
            created_at: timestamp(),
            updated_at: timestamp(),
            genres,
        }
    }

    fn genre(id: i64, title: &str) -> Genre {
        Genre {
            id,
            title: title.into(),
            created_at: timestamp(),
            updated_at: timestamp(),
            games: Association::Unloaded,
        }
    }

    #[test]
    fn test_unloaded_genres_are_omitted() {
        let value = serde_json::to_value(GameResource::from(game(Association::Unloaded))).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "God of war",
                "description": null,
                "created_at": "2021-12-11T09:25:53Z",
                "updated_at": "2021-12-11T09:25:53Z",
            })
        );
    }

    #[test]
    fn test_loaded_empty_genres_render_as_empty_array() {
        let value =
            serde_json::to_value(GameResource::from(game(Association::Loaded(vec![])))).unwrap();
        assert_eq!(value["genres"], json!([]));
    }

    #[test]
    fn test_loaded_genres_are_nested_without_their_games() {
        let loaded = Association::Loaded(vec![genre(1, "first genre"), genre(2, "second genre")]);
        let value = serde_json::to_value(GameResource::from(game(loaded))).unwrap();

        assert_eq!(
            value["genres"],
            json!([
                {
                    "id": 1,
                    "title": "first genre",
                    "created_at": "2021-12-11T09:25:53Z",
                    "updated_at": "2021-12-11T09:25:53Z",
                },
                {
                    "id": 2,
                    "title": "second genre",
                    "created_at": "2021-12-11T09:25:53Z",
                    "updated_at": "2021-12-11T09:25:53Z",
                },
            ])
        );
    }

    #[test]
    fn test_genre_with_loaded_games() {
        let mut rpg = genre(3, "RPG");
        rpg.games = Association::Loaded(vec![game(Association::Unloaded)]);

        let value = serde_json::to_value(GenreResource::from(rpg)).unwrap();
        assert_eq!(value["games"][0]["name"], "God of war");
        assert!(value["games"][0].get("genres").is_none());
        assert!(value.get("pivot").is_none());
    }
}
