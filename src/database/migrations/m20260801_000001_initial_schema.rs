use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Playlists::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Playlists::Name).string().not_null())
                    .col(ColumnDef::new(Playlists::SourceUrl).string())
                    .col(ColumnDef::new(Playlists::EpgUrl).string())
                    .col(
                        ColumnDef::new(Playlists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Playlists::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Channels::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Channels::PlaylistId).uuid().not_null())
                    .col(ColumnDef::new(Channels::TvgId).string().not_null())
                    .col(ColumnDef::new(Channels::Name).string().not_null())
                    .col(ColumnDef::new(Channels::TvgName).string())
                    .col(ColumnDef::new(Channels::Logo).string())
                    .col(ColumnDef::new(Channels::GroupTitle).string())
                    .col(ColumnDef::new(Channels::StreamUrl).text().not_null())
                    .col(ColumnDef::new(Channels::RawExtinf).text().not_null())
                    .col(
                        ColumnDef::new(Channels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Channels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channels_playlist")
                            .from(Channels::Table, Channels::PlaylistId)
                            .to(Playlists::Table, Playlists::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EpgProgrammes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EpgProgrammes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EpgProgrammes::PlaylistId).uuid().not_null())
                    .col(ColumnDef::new(EpgProgrammes::TvgId).string().not_null())
                    .col(
                        ColumnDef::new(EpgProgrammes::StartUtc)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EpgProgrammes::StopUtc)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EpgProgrammes::Title).text())
                    .col(ColumnDef::new(EpgProgrammes::Description).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_epg_programmes_playlist")
                            .from(EpgProgrammes::Table, EpgProgrammes::PlaylistId)
                            .to(Playlists::Table, Playlists::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_channels_playlist_tvg_id")
                    .table(Channels::Table)
                    .col(Channels::PlaylistId)
                    .col(Channels::TvgId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_epg_programmes_identity")
                    .table(EpgProgrammes::Table)
                    .col(EpgProgrammes::PlaylistId)
                    .col(EpgProgrammes::TvgId)
                    .col(EpgProgrammes::StartUtc)
                    .col(EpgProgrammes::StopUtc)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Covers the now/next lookups: equality on (playlist, channel) plus
        // a range scan over start times.
        manager
            .create_index(
                Index::create()
                    .name("idx_epg_programmes_window")
                    .table(EpgProgrammes::Table)
                    .col(EpgProgrammes::PlaylistId)
                    .col(EpgProgrammes::TvgId)
                    .col(EpgProgrammes::StartUtc)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EpgProgrammes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlists::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Playlists {
    Table,
    Id,
    Name,
    SourceUrl,
    EpgUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    PlaylistId,
    TvgId,
    Name,
    TvgName,
    Logo,
    GroupTitle,
    StreamUrl,
    RawExtinf,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EpgProgrammes {
    Table,
    Id,
    PlaylistId,
    TvgId,
    StartUtc,
    StopUtc,
    Title,
    Description,
}
