//! Playlist source repository

use std::sync::Arc;

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{playlists, prelude::Playlists};
use crate::models::PlaylistSource;

/// Request for playlist creation
#[derive(Debug, Clone)]
pub struct PlaylistCreateRequest {
    pub name: String,
    pub source_url: Option<String>,
    pub epg_url: Option<String>,
}

/// SeaORM-based repository for playlist sources
#[derive(Clone)]
pub struct PlaylistSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl PlaylistSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Create a new playlist source
    pub async fn create(&self, request: PlaylistCreateRequest) -> Result<PlaylistSource> {
        let now = chrono::Utc::now();

        let active_model = playlists::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            source_url: Set(request.source_url),
            epg_url: Set(request.epg_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    /// Find a playlist by ID
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<PlaylistSource>> {
        let model = Playlists::find_by_id(*id).one(&*self.connection).await?;
        Ok(model.map(Self::model_to_domain))
    }

    /// Playlists with a usable guide feed, oldest first.
    ///
    /// This is the periodic scheduler's work list: `epg_url` present and
    /// non-empty.
    pub async fn list_with_epg_url(&self) -> Result<Vec<PlaylistSource>> {
        let models = Playlists::find()
            .filter(playlists::Column::EpgUrl.is_not_null())
            .filter(playlists::Column::EpgUrl.ne(""))
            .order_by_asc(playlists::Column::CreatedAt)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    fn model_to_domain(model: playlists::Model) -> PlaylistSource {
        PlaylistSource {
            id: model.id,
            name: model.name,
            source_url: model.source_url,
            epg_url: model.epg_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
