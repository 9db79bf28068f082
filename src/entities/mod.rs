//! SeaORM entity definitions

pub mod channels;
pub mod epg_programmes;
pub mod playlists;
pub mod prelude;
