//! Service layer: ingest orchestration, guide refresh, now/next lookups

pub mod epg_refresh;
pub mod now_next;
pub mod playlist_ingest;

pub use epg_refresh::EpgRefreshService;
pub use now_next::NowNextService;
pub use playlist_ingest::PlaylistIngestService;
