//! Playlist ingest orchestration
//!
//! Ties the playlist parser to persistence: extract the guide URL, parse the
//! channel entries, create the playlist row, and upsert its channels. The
//! caller decides whether to follow up with a manual EPG refresh.

use tracing::info;

use crate::database::repositories::{
    ChannelSeaOrmRepository, PlaylistCreateRequest, PlaylistSeaOrmRepository,
};
use crate::errors::AppResult;
use crate::models::PlaylistIngest;
use crate::sources::m3u::{extract_epg_url, parse_playlist};

/// Service that turns raw playlist text into stored channels
#[derive(Clone)]
pub struct PlaylistIngestService {
    playlists: PlaylistSeaOrmRepository,
    channels: ChannelSeaOrmRepository,
}

impl PlaylistIngestService {
    pub fn new(playlists: PlaylistSeaOrmRepository, channels: ChannelSeaOrmRepository) -> Self {
        Self {
            playlists,
            channels,
        }
    }

    /// Ingest one playlist's text under a new playlist source.
    ///
    /// `source_url` records provenance when the text was downloaded rather
    /// than uploaded. Parsing never fails; a playlist with no recognizable
    /// entries simply stores zero channels.
    pub async fn ingest(
        &self,
        name: &str,
        source_url: Option<&str>,
        m3u_text: &str,
    ) -> AppResult<PlaylistIngest> {
        let epg_url = extract_epg_url(m3u_text);
        let parsed = parse_playlist(m3u_text);

        let playlist = self
            .playlists
            .create(PlaylistCreateRequest {
                name: name.to_string(),
                source_url: source_url.map(str::to_string),
                epg_url: epg_url.clone(),
            })
            .await?;

        self.channels
            .upsert_channels(playlist.id, &parsed)
            .await?;

        info!(
            "Ingested playlist '{}' ({}): {} channels, guide url: {}",
            playlist.name,
            playlist.id,
            parsed.len(),
            epg_url.as_deref().unwrap_or("none"),
        );

        Ok(PlaylistIngest {
            playlist_id: playlist.id,
            epg_url,
            channels_count: parsed.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    const PLAYLIST: &str = concat!(
        "#EXTM3U url-tvg=\"http://x/guide.xml\"\n",
        "#EXTINF:-1 tvg-id=\"ch1\" group-title=\"News\",Channel One\n",
        "http://stream/1\n",
        "#EXTINF:-1 tvg-id=\"ch2\",Channel Two\n",
        "http://stream/2\n",
    );

    #[tokio::test]
    async fn ingest_stores_channels_and_guide_url() {
        let db = Database::new_in_memory().await.unwrap();
        let playlists = PlaylistSeaOrmRepository::new(db.connection().clone());
        let channels = ChannelSeaOrmRepository::new(db.connection().clone());
        let service = PlaylistIngestService::new(playlists.clone(), channels.clone());

        let ingest = service.ingest("basic", None, PLAYLIST).await.unwrap();
        assert_eq!(ingest.channels_count, 2);
        assert_eq!(ingest.epg_url.as_deref(), Some("http://x/guide.xml"));

        let stored = playlists.find_by_id(&ingest.playlist_id).await.unwrap().unwrap();
        assert_eq!(stored.epg_url.as_deref(), Some("http://x/guide.xml"));

        let ch1 = channels
            .find_by_tvg_id(&ingest.playlist_id, "ch1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ch1.name, "Channel One");
        assert_eq!(ch1.group_title.as_deref(), Some("News"));
    }

    #[tokio::test]
    async fn ingest_of_unparseable_text_stores_zero_channels() {
        let db = Database::new_in_memory().await.unwrap();
        let service = PlaylistIngestService::new(
            PlaylistSeaOrmRepository::new(db.connection().clone()),
            ChannelSeaOrmRepository::new(db.connection().clone()),
        );

        let ingest = service.ingest("junk", None, "not a playlist").await.unwrap();
        assert_eq!(ingest.channels_count, 0);
        assert_eq!(ingest.epg_url, None);
    }
}
