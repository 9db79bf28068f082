//! Shared utilities: HTTP fetching, payload decompression, time handling

pub mod decompression;
pub mod http_client;
pub mod time;

pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::HttpClient;
