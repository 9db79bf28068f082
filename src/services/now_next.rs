//! Now/next query engine
//!
//! Thin wrapper over the programme repository's current-and-next lookup.
//! Entitlement is the caller's concern: the playlist list passed in is taken
//! as already-authorized, in priority order.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::repositories::EpgProgrammeSeaOrmRepository;
use crate::errors::AppResult;
use crate::models::{NowNext, ProgrammeView};

/// Service answering "what is airing now / next" for one channel
#[derive(Clone)]
pub struct NowNextService {
    programmes: EpgProgrammeSeaOrmRepository,
}

impl NowNextService {
    pub fn new(programmes: EpgProgrammeSeaOrmRepository) -> Self {
        Self { programmes }
    }

    /// Resolve now/next for `tvg_id` across `playlist_ids` at instant `now`.
    ///
    /// Returns the first playlist, in the given order, with any match;
    /// the explicit empty result when none has one.
    pub async fn now_next(
        &self,
        playlist_ids: &[Uuid],
        tvg_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<NowNext> {
        let Some((playlist_id, current, next)) = self
            .programmes
            .find_current_and_next(playlist_ids, tvg_id, now)
            .await?
        else {
            debug!("No schedule match for channel '{tvg_id}' across {} playlists", playlist_ids.len());
            return Ok(NowNext::empty(tvg_id));
        };

        Ok(NowNext {
            tvg_id: tvg_id.to_string(),
            playlist_id: Some(playlist_id),
            now: current.as_ref().map(ProgrammeView::from),
            next: next.as_ref().map(ProgrammeView::from),
        })
    }
}
