//! EPG programme repository
//!
//! Programmes are replaced wholesale per playlist on every refresh: delete
//! then batched insert, inside one transaction, so readers never observe a
//! mix of two upstream guide versions.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{epg_programmes, prelude::EpgProgrammes};
use crate::models::{EpgProgramme, XmltvProgramme};

/// Default number of programme rows per insert statement
const DEFAULT_INSERT_BATCH: usize = 500;

/// SeaORM-based repository for EPG programmes
#[derive(Clone)]
pub struct EpgProgrammeSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
    insert_batch: usize,
}

impl EpgProgrammeSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            connection,
            insert_batch: DEFAULT_INSERT_BATCH,
        }
    }

    /// Override the insert batch size (bounded below by 1)
    pub fn with_insert_batch(mut self, batch: usize) -> Self {
        self.insert_batch = batch.max(1);
        self
    }

    /// Replace the playlist's entire schedule with the given programmes.
    ///
    /// Consumes the iterator lazily, flushing one batch at a time, so peak
    /// memory stays proportional to the batch size. The delete and all
    /// inserts share a transaction; observers see either the old set or the
    /// new one, never a partial state. Returns the number of programmes
    /// written.
    pub async fn replace_for_playlist(
        &self,
        playlist_id: Uuid,
        programmes: impl IntoIterator<Item = XmltvProgramme>,
    ) -> Result<u64> {
        let txn = self.connection.begin().await?;

        EpgProgrammes::delete_many()
            .filter(epg_programmes::Column::PlaylistId.eq(playlist_id))
            .exec(&txn)
            .await?;

        let mut inserted = 0u64;
        let mut batch = Vec::with_capacity(self.insert_batch);
        for programme in programmes {
            batch.push(Self::active_model(playlist_id, programme));
            if batch.len() >= self.insert_batch {
                inserted += Self::insert_batch(&txn, std::mem::take(&mut batch)).await?;
            }
        }
        if !batch.is_empty() {
            inserted += Self::insert_batch(&txn, batch).await?;
        }

        txn.commit().await?;
        Ok(inserted)
    }

    /// Walk the playlists in the given priority order and return the first
    /// with any match for the channel: the currently-airing programme
    /// (`start_utc <= now < stop_utc`, latest start on overlap) and the next
    /// one (earliest `start_utc > now`). `None` means no playlist matched.
    pub async fn find_current_and_next(
        &self,
        playlist_ids: &[Uuid],
        tvg_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Uuid, Option<EpgProgramme>, Option<EpgProgramme>)>> {
        for playlist_id in playlist_ids {
            let current = EpgProgrammes::find()
                .filter(epg_programmes::Column::PlaylistId.eq(*playlist_id))
                .filter(epg_programmes::Column::TvgId.eq(tvg_id))
                .filter(epg_programmes::Column::StartUtc.lte(now))
                .filter(epg_programmes::Column::StopUtc.gt(now))
                .order_by_desc(epg_programmes::Column::StartUtc)
                .one(&*self.connection)
                .await?;

            let next = EpgProgrammes::find()
                .filter(epg_programmes::Column::PlaylistId.eq(*playlist_id))
                .filter(epg_programmes::Column::TvgId.eq(tvg_id))
                .filter(epg_programmes::Column::StartUtc.gt(now))
                .order_by_asc(epg_programmes::Column::StartUtc)
                .one(&*self.connection)
                .await?;

            if current.is_some() || next.is_some() {
                return Ok(Some((
                    *playlist_id,
                    current.map(Self::model_to_domain),
                    next.map(Self::model_to_domain),
                )));
            }
        }

        Ok(None)
    }

    /// Full stored schedule for a playlist, ordered by start time
    pub async fn find_by_playlist(&self, playlist_id: &Uuid) -> Result<Vec<EpgProgramme>> {
        let models = EpgProgrammes::find()
            .filter(epg_programmes::Column::PlaylistId.eq(*playlist_id))
            .order_by_asc(epg_programmes::Column::StartUtc)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(Self::model_to_domain).collect())
    }

    /// Programme count for a playlist
    pub async fn count_by_playlist(&self, playlist_id: &Uuid) -> Result<u64> {
        let count = EpgProgrammes::find()
            .filter(epg_programmes::Column::PlaylistId.eq(*playlist_id))
            .count(&*self.connection)
            .await?;
        Ok(count)
    }

    async fn insert_batch(
        txn: &DatabaseTransaction,
        batch: Vec<epg_programmes::ActiveModel>,
    ) -> Result<u64> {
        let written = batch.len() as u64;

        // The composite identity can repeat within one upstream guide;
        // resolve to the last write rather than failing the refresh.
        EpgProgrammes::insert_many(batch)
            .on_conflict(
                OnConflict::columns([
                    epg_programmes::Column::PlaylistId,
                    epg_programmes::Column::TvgId,
                    epg_programmes::Column::StartUtc,
                    epg_programmes::Column::StopUtc,
                ])
                .update_columns([
                    epg_programmes::Column::Title,
                    epg_programmes::Column::Description,
                ])
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        Ok(written)
    }

    fn active_model(playlist_id: Uuid, programme: XmltvProgramme) -> epg_programmes::ActiveModel {
        epg_programmes::ActiveModel {
            id: Set(Uuid::new_v4()),
            playlist_id: Set(playlist_id),
            tvg_id: Set(programme.tvg_id),
            start_utc: Set(programme.start_utc),
            stop_utc: Set(programme.stop_utc),
            title: Set(programme.title),
            description: Set(programme.description),
        }
    }

    fn model_to_domain(model: epg_programmes::Model) -> EpgProgramme {
        EpgProgramme {
            id: model.id,
            playlist_id: model.playlist_id,
            tvg_id: model.tvg_id,
            start_utc: model.start_utc,
            stop_utc: model.stop_utc,
            title: model.title,
            description: model.description,
        }
    }
}
