//! EPG refresh coordination
//!
//! One refresh downloads a playlist's guide feed, unwraps the optional gzip
//! envelope, stream-parses the XMLTV document, and replaces the playlist's
//! stored schedule in one transaction. Download and decompression failures
//! surface as errors; per-element parse skips are silent and only lower the
//! inserted count.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::database::repositories::EpgProgrammeSeaOrmRepository;
use crate::errors::AppResult;
use crate::models::RefreshOutcome;
use crate::sources::xmltv::{decode_guide, parse_programmes};
use crate::utils::HttpClient;

/// Default bound on one guide download, connect plus transfer
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Service that keeps per-playlist schedules in sync with upstream guides
#[derive(Clone)]
pub struct EpgRefreshService {
    http_client: HttpClient,
    programmes: EpgProgrammeSeaOrmRepository,
}

impl EpgRefreshService {
    pub fn new(programmes: EpgProgrammeSeaOrmRepository, download_timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::with_timeout(download_timeout),
            programmes,
        }
    }

    /// Fetch the guide and replace the playlist's schedule with its contents
    pub async fn refresh(&self, playlist_id: Uuid, epg_url: &str) -> AppResult<RefreshOutcome> {
        let started_at = Utc::now();
        let bytes = self.http_client.fetch_bytes(epg_url).await?;
        self.refresh_from_bytes(playlist_id, epg_url, &bytes, started_at)
            .await
    }

    /// Fetch-free refresh path over an already-downloaded payload
    pub async fn refresh_from_bytes(
        &self,
        playlist_id: Uuid,
        epg_url: &str,
        bytes: &[u8],
        started_at: DateTime<Utc>,
    ) -> AppResult<RefreshOutcome> {
        let xml = decode_guide(bytes)?;
        let programmes = parse_programmes(&xml);

        let programmes_inserted = self
            .programmes
            .replace_for_playlist(playlist_id, programmes)
            .await?;

        info!(
            "Refreshed EPG for playlist {playlist_id}: {programmes_inserted} programmes from {epg_url}"
        );

        Ok(RefreshOutcome {
            playlist_id,
            epg_url: epg_url.to_string(),
            programmes_inserted,
            started_at,
        })
    }
}
