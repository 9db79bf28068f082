//! Channel repository
//!
//! Channels are upserted by `(playlist_id, tvg_id)` and never deleted here:
//! entries absent from a newer playlist parse are intentionally retained.

use std::sync::Arc;

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{channels, prelude::Channels};
use crate::models::{Channel, ParsedChannel};

/// Default cap for channel listings
pub const DEFAULT_CHANNEL_LIST_LIMIT: u64 = 5000;

/// SeaORM-based repository for channels
#[derive(Clone)]
pub struct ChannelSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ChannelSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Insert-or-overwrite each parsed channel under the playlist.
    ///
    /// Channels are applied one at a time in parse order, so a duplicate
    /// identity within the same call resolves to the last write.
    pub async fn upsert_channels(
        &self,
        playlist_id: Uuid,
        parsed: &[ParsedChannel],
    ) -> Result<u64> {
        let mut applied = 0u64;

        for channel in parsed {
            let now = chrono::Utc::now();
            let active_model = channels::ActiveModel {
                id: Set(Uuid::new_v4()),
                playlist_id: Set(playlist_id),
                tvg_id: Set(channel.tvg_id.clone()),
                name: Set(channel.name.clone()),
                tvg_name: Set(channel.tvg_name.clone()),
                logo: Set(channel.logo.clone()),
                group_title: Set(channel.group_title.clone()),
                stream_url: Set(channel.stream_url.clone()),
                raw_extinf: Set(channel.raw_extinf.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            Channels::insert(active_model)
                .on_conflict(
                    OnConflict::columns([channels::Column::PlaylistId, channels::Column::TvgId])
                        .update_columns([
                            channels::Column::Name,
                            channels::Column::TvgName,
                            channels::Column::Logo,
                            channels::Column::GroupTitle,
                            channels::Column::StreamUrl,
                            channels::Column::RawExtinf,
                            channels::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&*self.connection)
                .await?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Find one channel by its identity within a playlist
    pub async fn find_by_tvg_id(
        &self,
        playlist_id: &Uuid,
        tvg_id: &str,
    ) -> Result<Option<Channel>> {
        let model = Channels::find()
            .filter(channels::Column::PlaylistId.eq(*playlist_id))
            .filter(channels::Column::TvgId.eq(tvg_id))
            .one(&*self.connection)
            .await?;

        Ok(model.map(Self::model_to_domain))
    }

    /// Distinct non-empty group labels across the given playlists, sorted
    pub async fn list_groups(&self, playlist_ids: &[Uuid]) -> Result<Vec<String>> {
        if playlist_ids.is_empty() {
            return Ok(Vec::new());
        }

        let groups: Vec<String> = Channels::find()
            .select_only()
            .column(channels::Column::GroupTitle)
            .filter(channels::Column::PlaylistId.is_in(playlist_ids.iter().copied()))
            .filter(channels::Column::GroupTitle.is_not_null())
            .filter(channels::Column::GroupTitle.ne(""))
            .distinct()
            .order_by_asc(channels::Column::GroupTitle)
            .into_tuple()
            .all(&*self.connection)
            .await?;

        Ok(groups)
    }

    /// Channels across the given playlists, optionally narrowed to an exact
    /// group and/or a substring search over name, tvg id, and alt name.
    pub async fn list_channels(
        &self,
        playlist_ids: &[Uuid],
        group: Option<&str>,
        search: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<Channel>> {
        if playlist_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = Channels::find()
            .filter(channels::Column::PlaylistId.is_in(playlist_ids.iter().copied()));

        if let Some(group) = group {
            query = query.filter(channels::Column::GroupTitle.eq(group));
        }
        if let Some(search) = search {
            query = query.filter(
                Condition::any()
                    .add(channels::Column::Name.contains(search))
                    .add(channels::Column::TvgId.contains(search))
                    .add(channels::Column::TvgName.contains(search)),
            );
        }

        let models = query
            .order_by_asc(channels::Column::GroupTitle)
            .order_by_asc(channels::Column::Name)
            .limit(limit.unwrap_or(DEFAULT_CHANNEL_LIST_LIMIT))
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    /// Channel count for a playlist
    pub async fn count_by_playlist(&self, playlist_id: &Uuid) -> Result<u64> {
        let count = Channels::find()
            .filter(channels::Column::PlaylistId.eq(*playlist_id))
            .count(&*self.connection)
            .await?;
        Ok(count)
    }

    fn model_to_domain(model: channels::Model) -> Channel {
        Channel {
            id: model.id,
            playlist_id: model.playlist_id,
            tvg_id: model.tvg_id,
            name: model.name,
            tvg_name: model.tvg_name,
            logo: model.logo,
            group_title: model.group_title,
            stream_url: model.stream_url,
            raw_extinf: model.raw_extinf,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::database::repositories::playlist::{
        PlaylistCreateRequest, PlaylistSeaOrmRepository,
    };

    fn parsed(tvg_id: &str, name: &str, group: Option<&str>) -> ParsedChannel {
        ParsedChannel {
            tvg_id: tvg_id.to_string(),
            name: name.to_string(),
            tvg_name: None,
            logo: None,
            group_title: group.map(str::to_string),
            stream_url: format!("http://stream/{tvg_id}"),
            raw_extinf: format!("#EXTINF:-1 tvg-id=\"{tvg_id}\",{name}"),
        }
    }

    async fn test_playlist(db: &Database) -> Uuid {
        PlaylistSeaOrmRepository::new(db.connection().clone())
            .create(PlaylistCreateRequest {
                name: "test".to_string(),
                source_url: None,
                epg_url: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn upsert_overwrites_by_identity() -> Result<()> {
        let db = Database::new_in_memory().await?;
        let playlist_id = test_playlist(&db).await;
        let repo = ChannelSeaOrmRepository::new(db.connection().clone());

        repo.upsert_channels(playlist_id, &[parsed("ch1", "Old Name", Some("News"))])
            .await?;
        repo.upsert_channels(playlist_id, &[parsed("ch1", "New Name", Some("Headlines"))])
            .await?;

        assert_eq!(repo.count_by_playlist(&playlist_id).await?, 1);
        let ch = repo.find_by_tvg_id(&playlist_id, "ch1").await?.unwrap();
        assert_eq!(ch.name, "New Name");
        assert_eq!(ch.group_title.as_deref(), Some("Headlines"));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_identity_in_one_call_last_write_wins() -> Result<()> {
        let db = Database::new_in_memory().await?;
        let playlist_id = test_playlist(&db).await;
        let repo = ChannelSeaOrmRepository::new(db.connection().clone());

        repo.upsert_channels(
            playlist_id,
            &[
                parsed("ch1", "First", None),
                parsed("ch1", "Second", None),
            ],
        )
        .await?;

        assert_eq!(repo.count_by_playlist(&playlist_id).await?, 1);
        let ch = repo.find_by_tvg_id(&playlist_id, "ch1").await?.unwrap();
        assert_eq!(ch.name, "Second");
        Ok(())
    }

    #[tokio::test]
    async fn stale_channels_are_retained() -> Result<()> {
        let db = Database::new_in_memory().await?;
        let playlist_id = test_playlist(&db).await;
        let repo = ChannelSeaOrmRepository::new(db.connection().clone());

        repo.upsert_channels(
            playlist_id,
            &[parsed("ch1", "One", None), parsed("ch2", "Two", None)],
        )
        .await?;
        // A later, smaller parse does not delete ch2.
        repo.upsert_channels(playlist_id, &[parsed("ch1", "One v2", None)])
            .await?;

        assert_eq!(repo.count_by_playlist(&playlist_id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn groups_and_channel_listing() -> Result<()> {
        let db = Database::new_in_memory().await?;
        let playlist_id = test_playlist(&db).await;
        let repo = ChannelSeaOrmRepository::new(db.connection().clone());

        repo.upsert_channels(
            playlist_id,
            &[
                parsed("news1", "Alpha News", Some("News")),
                parsed("news2", "Beta News", Some("News")),
                parsed("sport1", "Gamma Sports", Some("Sports")),
                parsed("misc1", "No Group", None),
            ],
        )
        .await?;

        let groups = repo.list_groups(&[playlist_id]).await?;
        assert_eq!(groups, vec!["News".to_string(), "Sports".to_string()]);

        let news = repo
            .list_channels(&[playlist_id], Some("News"), None, None)
            .await?;
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].name, "Alpha News");

        let found = repo
            .list_channels(&[playlist_id], None, Some("Gamma"), None)
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tvg_id, "sport1");

        let limited = repo
            .list_channels(&[playlist_id], None, None, Some(2))
            .await?;
        assert_eq!(limited.len(), 2);

        assert!(repo.list_channels(&[], None, None, None).await?.is_empty());
        Ok(())
    }
}
