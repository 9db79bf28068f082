//! SeaORM repositories
//!
//! Each repository is a thin, focused wrapper over the shared connection,
//! converting entity models to domain models at the boundary.

pub mod channel;
pub mod epg_programme;
pub mod playlist;

pub use channel::ChannelSeaOrmRepository;
pub use epg_programme::EpgProgrammeSeaOrmRepository;
pub use playlist::{PlaylistCreateRequest, PlaylistSeaOrmRepository};
