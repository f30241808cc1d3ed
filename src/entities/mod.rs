pub mod game;
pub mod game_genre;
pub mod genre;
