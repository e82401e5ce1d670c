//! Generic chunked-compression framing of ORC structural sections
//!
//! When a file declares a codec, every section (footer, metadata, stripe
//! footer) starts with a 3 byte little-endian chunk header:
//!
//! ```text
//! value = is_original | (chunk_length << 1)
//! ```
//!
//! An "original" chunk is stored uncompressed even though the file declares a
//! codec. A section is decoded as exactly one chunk, bounded by the section
//! length recorded in the enclosing record.

use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use tracing::warn;

use crate::error::{OrcError, Result};
use crate::proto::CompressionKind;

/// Size of the chunk header in bytes
pub const CHUNK_HEADER_SIZE: u64 = 3;

/// Largest length a 23-bit chunk header can record
pub const MAX_CHUNK_LENGTH: u64 = (1 << 23) - 1;

/// Compression declared file-wide in the postscript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Zlib,
    Snappy,
    Lzo,
    Lz4,
    Zstd,
    /// A kind number outside the closed set the container format defines
    Unrecognized(i32),
}

impl Compression {
    /// Resolves the raw postscript field; a missing field means no compression
    pub fn from_raw(value: Option<i32>) -> Self {
        let Some(value) = value else {
            return Compression::None;
        };
        match CompressionKind::try_from(value) {
            Ok(CompressionKind::None) => Compression::None,
            Ok(CompressionKind::Zlib) => Compression::Zlib,
            Ok(CompressionKind::Snappy) => Compression::Snappy,
            Ok(CompressionKind::Lzo) => Compression::Lzo,
            Ok(CompressionKind::Lz4) => Compression::Lz4,
            Ok(CompressionKind::Zstd) => Compression::Zstd,
            Err(_) => Compression::Unrecognized(value),
        }
    }

    /// Returns true when sections are stored without chunk framing
    pub fn is_none(&self) -> bool {
        matches!(self, Compression::None)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str(CompressionKind::None.as_str_name()),
            Compression::Zlib => f.write_str(CompressionKind::Zlib.as_str_name()),
            Compression::Snappy => f.write_str(CompressionKind::Snappy.as_str_name()),
            Compression::Lzo => f.write_str(CompressionKind::Lzo.as_str_name()),
            Compression::Lz4 => f.write_str(CompressionKind::Lz4.as_str_name()),
            Compression::Zstd => f.write_str(CompressionKind::Zstd.as_str_name()),
            Compression::Unrecognized(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}

/// Decoded 3 byte chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub is_original: bool,
    pub length: u32,
}

impl ChunkHeader {
    pub fn decode(bytes: [u8; 3]) -> Self {
        let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]);
        Self {
            is_original: value & 1 == 1,
            length: value >> 1,
        }
    }
}

/// Decodes one compressed section read from `reader`.
///
/// `declared_length` is the section length recorded by the enclosing record
/// (header included). When the chunk header disagrees with it, the header
/// wins and the mismatch is only logged. Output is bounded by
/// [`MAX_CHUNK_LENGTH`].
pub fn decompress<R: Read>(reader: R, declared_length: u64, compression: Compression) -> Result<Vec<u8>> {
    decompress_bounded(reader, declared_length, compression, MAX_CHUNK_LENGTH)
}

/// Like [`decompress`], rejecting chunks that inflate past `max_output` bytes.
///
/// Writers never emit a chunk larger than the file's compression block size,
/// which is the bound the reader passes.
pub fn decompress_bounded<R: Read>(
    mut reader: R,
    declared_length: u64,
    compression: Compression,
    max_output: u64,
) -> Result<Vec<u8>> {
    let mut header = [0u8; 3];
    reader.read_exact(&mut header)?;
    let header = ChunkHeader::decode(header);

    let expected = declared_length.saturating_sub(CHUNK_HEADER_SIZE);
    let chunk_length = u64::from(header.length);
    if chunk_length != expected {
        warn!(
            chunk_length,
            expected, "Compressed chunk length differs from declared section length"
        );
    }

    // A header claiming more than the section holds yields a shorter chunk;
    // the codec or the message decoder reports it if the bytes are unusable
    let mut chunk = Vec::with_capacity(chunk_length.min(expected) as usize);
    reader.take(chunk_length).read_to_end(&mut chunk)?;

    if header.is_original {
        return Ok(chunk);
    }

    let decompression_error = |message: String| OrcError::Decompression {
        codec: compression.to_string(),
        message,
    };
    let too_large = || decompression_error(format!("chunk inflates to more than {} bytes", max_output));

    match compression {
        Compression::Zlib => {
            let mut decoded = Vec::new();
            flate2::read::DeflateDecoder::new(chunk.as_slice())
                .take(max_output.saturating_add(1))
                .read_to_end(&mut decoded)
                .map_err(|e| decompression_error(e.to_string()))?;
            if decoded.len() as u64 > max_output {
                return Err(too_large());
            }
            Ok(decoded)
        }
        Compression::Snappy => {
            let length =
                snap::raw::decompress_len(&chunk).map_err(|e| decompression_error(e.to_string()))?;
            if length as u64 > max_output {
                return Err(too_large());
            }
            snap::raw::Decoder::new()
                .decompress_vec(&chunk)
                .map_err(|e| decompression_error(e.to_string()))
        }
        other => Err(OrcError::UnsupportedCompression(other.to_string())),
    }
}

/// Returns the section bytes ready for the message decoder, unwrapping the
/// chunk framing when the file is compressed.
///
/// `block_size` is the postscript's compression block size, when recorded.
pub(crate) fn read_section(
    bytes: &[u8],
    compression: Compression,
    block_size: Option<u64>,
) -> Result<Cow<'_, [u8]>> {
    if compression.is_none() {
        return Ok(Cow::Borrowed(bytes));
    }
    let max_output = block_size.map_or(MAX_CHUNK_LENGTH, |size| size.min(MAX_CHUNK_LENGTH));
    decompress_bounded(bytes, bytes.len() as u64, compression, max_output).map(Cow::Owned)
}
