//! Magic-byte detection and decompression for fetched guide payloads
//!
//! Guide providers commonly serve XMLTV gzip-compressed without saying so in
//! the headers, so detection goes by the payload's magic bytes rather than
//! content type.

use anyhow::Result;
use bytes::Bytes;

#[cfg(feature = "compression-gzip")]
use anyhow::Context;
#[cfg(feature = "compression-gzip")]
use flate2::read::GzDecoder;
#[cfg(feature = "compression-gzip")]
use std::io::Read;

/// Compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic detection and decompression utility
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        if data.len() >= 2 && data[0..2] == [0x1F, 0x8B] {
            CompressionFormat::Gzip
        } else {
            CompressionFormat::Uncompressed
        }
    }

    /// Decompress data based on detected format; uncompressed data passes
    /// through unchanged. A payload that carries the gzip magic but fails to
    /// inflate is an error - the whole payload is unusable.
    pub fn decompress(data: Bytes) -> Result<Vec<u8>> {
        match Self::detect_compression_format(&data) {
            CompressionFormat::Gzip => Self::decompress_gzip(data),
            CompressionFormat::Uncompressed => Ok(data.to_vec()),
        }
    }

    #[cfg(feature = "compression-gzip")]
    fn decompress_gzip(data: Bytes) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data.as_ref());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress gzip data")?;
        Ok(decompressed)
    }

    #[cfg(not(feature = "compression-gzip"))]
    fn decompress_gzip(_data: Bytes) -> Result<Vec<u8>> {
        anyhow::bail!("gzip payload received but the compression-gzip feature is disabled")
    }
}
