//! Domain models shared across parsers, repositories, and services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::format_utc;

/// A playlist source: one provider's channel list plus its optional EPG feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSource {
    pub id: Uuid,
    pub name: String,
    /// Where the playlist text came from, when known (URL or upload label)
    pub source_url: Option<String>,
    /// Guide feed announced by the playlist header, if any
    pub epg_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One channel entry produced by the playlist parser.
///
/// This is the parser's output shape; it has no identity of its own until it
/// is upserted under a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChannel {
    /// Channel identity within the playlist (resolved per the fallback chain)
    pub tvg_id: String,
    pub name: String,
    pub tvg_name: Option<String>,
    pub logo: Option<String>,
    pub group_title: Option<String>,
    pub stream_url: String,
    /// The original descriptor line, kept verbatim for diagnostics
    pub raw_extinf: String,
}

/// A stored channel row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub playlist_id: Uuid,
    pub tvg_id: String,
    pub name: String,
    pub tvg_name: Option<String>,
    pub logo: Option<String>,
    pub group_title: Option<String>,
    pub stream_url: String,
    pub raw_extinf: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One programme element extracted from an XMLTV guide, times already UTC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmltvProgramme {
    pub tvg_id: String,
    pub start_utc: DateTime<Utc>,
    pub stop_utc: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A stored programme row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgProgramme {
    pub id: Uuid,
    pub playlist_id: Uuid,
    pub tvg_id: String,
    pub start_utc: DateTime<Utc>,
    pub stop_utc: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Result of one playlist ingest
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistIngest {
    pub playlist_id: Uuid,
    pub epg_url: Option<String>,
    pub channels_count: usize,
}

/// Result of one EPG refresh, returned to the caller and otherwise discarded
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub playlist_id: Uuid,
    pub epg_url: String,
    pub programmes_inserted: u64,
    pub started_at: DateTime<Utc>,
}

/// Programme view returned by now/next lookups.
///
/// Times are rendered in the canonical `Z`-suffixed UTC form so downstream
/// string comparisons stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammeView {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: String,
    pub stop: String,
}

impl From<&EpgProgramme> for ProgrammeView {
    fn from(p: &EpgProgramme) -> Self {
        ProgrammeView {
            title: p.title.clone(),
            description: p.description.clone(),
            start: format_utc(p.start_utc),
            stop: format_utc(p.stop_utc),
        }
    }
}

/// Now/next answer for one channel across a prioritized set of playlists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowNext {
    pub tvg_id: String,
    /// The first playlist, in caller priority order, with any match.
    /// `None` means the channel airs on none of the given playlists.
    pub playlist_id: Option<Uuid>,
    pub now: Option<ProgrammeView>,
    pub next: Option<ProgrammeView>,
}

impl NowNext {
    /// The explicit "no match" result
    pub fn empty(tvg_id: impl Into<String>) -> Self {
        NowNext {
            tvg_id: tvg_id.into(),
            playlist_id: None,
            now: None,
            next: None,
        }
    }
}
