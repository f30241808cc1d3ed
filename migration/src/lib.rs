pub use sea_orm_migration::prelude::*;

mod m20220921_000001_create_games_and_genres_tables;
mod m20220921_000002_create_game_genre_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220921_000001_create_games_and_genres_tables::Migration),
            Box::new(m20220921_000002_create_game_genre_table::Migration),
        ]
    }
}
