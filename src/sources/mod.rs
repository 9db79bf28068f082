//! Parsers for the two third-party source formats the service consumes:
//! extended-M3U playlists and XMLTV program guides.

pub mod m3u;
pub mod xmltv;
