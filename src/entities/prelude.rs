pub use super::channels::Entity as Channels;
pub use super::epg_programmes::Entity as EpgProgrammes;
pub use super::playlists::Entity as Playlists;
