use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The composite primary key doubles as the unique (game_id, genre_id) constraint
        manager
            .create_table(
                Table::create()
                    .table(GameGenre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameGenre::GameId).integer().not_null())
                    .col(ColumnDef::new(GameGenre::GenreId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GameGenre::GameId)
                            .col(GameGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_genre_game_id")
                            .from(GameGenre::Table, GameGenre::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_genre_genre_id")
                            .from(GameGenre::Table, GameGenre::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse lookups (games of a genre) can't use the primary key prefix
        manager
            .create_index(
                Index::create()
                    .name("idx_game_genre_genre_id")
                    .table(GameGenre::Table)
                    .col(GameGenre::GenreId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameGenre::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameGenre {
    Table,
    GameId,
    GenreId,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    Id,
}
