//! ORC file tail resolution and the structural metadata store
//!
//! The tail of an ORC file is laid out, reading backwards from the end, as:
//!
//! ```text
//! [ ... stripes ... ][ metadata ][ footer ][ postscript ][ postscript length: 1 byte ]
//! ```
//!
//! Opening a file reads a fixed-size guess of the tail, decodes the
//! postscript from it and then the footer, rereading the footer range once
//! when the guess turned out to be too small.

use std::borrow::Cow;
use std::path::Path;

use prost::Message;
use tracing::{debug, warn};

use crate::decompress::{read_section, Compression};
use crate::error::{OrcError, Result};
use crate::proto::{Footer, Metadata, PostScript, StripeInformation, Type, UserMetadataItem};
use crate::source::{read_full_at, read_range, LocalFile, RandomAccessSource};
use crate::statistics::{convert_all, ColumnStats};

/// Default number of trailing bytes read when opening a file
pub const TAIL_SIZE_GUESS: u64 = 16 * 1024;

/// Smallest tail guess that can always hold the postscript and its length byte
pub const MIN_TAIL_SIZE_GUESS: u64 = 256;

const MAGIC: &str = "ORC";

/// Names of the writer versions recorded in the postscript
const WRITER_VERSIONS: &[(u32, &str)] = &[
    (1, "HIVE-8732"),
    (2, "HIVE-4243"),
    (3, "HIVE-12055"),
    (4, "HIVE-13083"),
    (5, "ORC-101"),
    (6, "ORC-135"),
    (7, "ORC-517"),
    (8, "ORC-203"),
    (9, "ORC-14"),
];

/// Returns the name of a writer version, "original" when unknown
pub fn writer_version_name(version: u32) -> &'static str {
    WRITER_VERSIONS
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, name)| *name)
        .unwrap_or("original")
}

/// Options controlling how a file tail is read
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Trailing bytes read in the first pass (default: 16 KiB).
    /// Values below 256 are raised to 256.
    pub tail_size_guess: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            tail_size_guess: TAIL_SIZE_GUESS,
        }
    }
}

/// An opened ORC file with its postscript and footer resolved
pub struct OrcFile<S: RandomAccessSource = LocalFile> {
    source: S,
    postscript: PostScript,
    footer: Footer,
    compression: Compression,
    length: u64,
    postscript_length: u64,
}

/// Parsed tail, before it is attached to its source
struct Tail {
    postscript: PostScript,
    footer: Footer,
    postscript_length: u64,
}

impl OrcFile<LocalFile> {
    /// Opens an ORC file on the local filesystem
    pub fn open<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        let source = LocalFile::open(path)?;
        Self::from_source(source, options)
    }
}

impl<S: RandomAccessSource> OrcFile<S> {
    /// Resolves the tail of an ORC file held by `source`.
    ///
    /// On failure the source is closed before the error is returned.
    pub fn from_source(source: S, options: &ReadOptions) -> Result<Self> {
        let loaded = source
            .len()
            .map_err(OrcError::from)
            .and_then(|length| load_tail(&source, length, options).map(|tail| (length, tail)));

        match loaded {
            Ok((length, tail)) => {
                let compression = Compression::from_raw(tail.postscript.compression);
                debug!(
                    name = source.name(),
                    length,
                    postscript_length = tail.postscript_length,
                    footer_length = tail.postscript.footer_length(),
                    compression = %compression,
                    stripes = tail.footer.stripes.len(),
                    "Loaded ORC tail"
                );
                Ok(Self {
                    source,
                    postscript: tail.postscript,
                    footer: tail.footer,
                    compression,
                    length,
                    postscript_length: tail.postscript_length,
                })
            }
            Err(e) => {
                let name = source.name().to_string();
                if let Err(close_err) = source.close() {
                    warn!(name = %name, "Failed to close source after open error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Closes the file, releasing the underlying source
    pub fn close(self) -> Result<()> {
        Ok(self.source.close()?)
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Name of the underlying source
    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn postscript(&self) -> &PostScript {
        &self.postscript
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// Total file length in bytes
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Serialized postscript length in bytes
    pub fn postscript_length(&self) -> u64 {
        self.postscript_length
    }

    /// Compression declared for every structural section
    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn compression_block_size(&self) -> Option<u64> {
        self.postscript.compression_block_size
    }

    /// Stored (possibly compressed) footer length in bytes
    pub fn footer_length(&self) -> u64 {
        self.postscript.footer_length()
    }

    /// Stored (possibly compressed) metadata section length, 0 when absent
    pub fn metadata_length(&self) -> u64 {
        self.postscript.metadata_length()
    }

    /// File format version, e.g. "0.12"
    pub fn format_version(&self) -> String {
        self.postscript
            .version
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Name of the writer version that produced the file
    pub fn writer_version(&self) -> &'static str {
        writer_version_name(self.postscript.writer_version())
    }

    pub fn number_of_rows(&self) -> u64 {
        self.footer.number_of_rows()
    }

    pub fn content_length(&self) -> u64 {
        self.footer.content_length()
    }

    pub fn row_index_stride(&self) -> u32 {
        self.footer.row_index_stride()
    }

    pub fn types(&self) -> &[Type] {
        &self.footer.types
    }

    pub fn stripes(&self) -> &[StripeInformation] {
        &self.footer.stripes
    }

    pub fn user_metadata(&self) -> &[UserMetadataItem] {
        &self.footer.metadata
    }

    /// File-level column statistics embedded in the footer
    pub fn statistics(&self) -> Vec<ColumnStats> {
        convert_all(&self.footer.statistics)
    }

    /// Reads the metadata section holding stripe-level statistics.
    ///
    /// Returns `Ok(None)` when the file has no metadata section.
    pub fn metadata(&self) -> Result<Option<Metadata>> {
        let metadata_length = self.metadata_length();
        if metadata_length == 0 {
            debug!(name = self.name(), "No metadata section");
            return Ok(None);
        }

        let tail_length = (1 + self.postscript_length)
            .saturating_add(self.footer_length())
            .saturating_add(metadata_length);
        if tail_length > self.length {
            return Err(OrcError::InvalidLayout(format!(
                "metadata section of {} bytes does not fit in file of {} bytes",
                metadata_length, self.length
            )));
        }
        let offset = self.length - tail_length;
        debug!(name = self.name(), offset, metadata_length, "Reading metadata section");

        let bytes = read_range(&self.source, offset, metadata_length)?;
        let decoded = read_section(&bytes, self.compression, self.compression_block_size())?;
        let metadata = Metadata::decode(&*decoded).map_err(|e| OrcError::decode("metadata", e))?;
        Ok(Some(metadata))
    }

    /// Stripe-level column statistics, one list per stripe.
    ///
    /// Returns `Ok(None)` when the file has no metadata section.
    pub fn stripe_statistics(&self) -> Result<Option<Vec<Vec<ColumnStats>>>> {
        Ok(self.metadata()?.map(|metadata| {
            metadata
                .stripe_stats
                .iter()
                .map(|stripe| convert_all(&stripe.col_stats))
                .collect()
        }))
    }
}

/// Reads the trailing bytes of the file and decodes the postscript, then the footer
fn load_tail<S: RandomAccessSource>(source: &S, length: u64, options: &ReadOptions) -> Result<Tail> {
    let read_size = options.tail_size_guess.max(MIN_TAIL_SIZE_GUESS).min(length);
    let mut tail = vec![0u8; read_size as usize];
    let read = read_full_at(source, &mut tail, length - read_size)?;
    if read < 4 || read < tail.len() {
        return Err(OrcError::TruncatedTail {
            name: source.name().to_string(),
            read,
        });
    }

    // The last byte is the postscript length, always a single unsigned byte
    let postscript_length = u64::from(tail[read - 1]);
    if postscript_length == 0 || postscript_length + 1 > read as u64 {
        return Err(OrcError::InvalidLayout(format!(
            "postscript length {} does not fit in a tail of {} bytes",
            postscript_length, read
        )));
    }

    let postscript_end = read - 1;
    let postscript_start = postscript_end - postscript_length as usize;
    let postscript = PostScript::decode(&tail[postscript_start..postscript_end])
        .map_err(|e| OrcError::decode("postscript", e))?;

    if postscript.magic.as_deref() != Some(MAGIC) {
        return Err(OrcError::UnexpectedMagic(
            postscript.magic.clone().unwrap_or_default(),
        ));
    }

    let tail_length = (1 + postscript_length).saturating_add(postscript.footer_length());
    if tail_length > length {
        return Err(OrcError::InvalidLayout(format!(
            "footer of {} bytes does not fit in file of {} bytes",
            postscript.footer_length(),
            length
        )));
    }

    let footer = load_footer(source, length, &postscript, postscript_length, &tail)?;
    Ok(Tail {
        postscript,
        footer,
        postscript_length,
    })
}

/// Decodes the footer, slicing it out of the tail buffer when the first read caught it
fn load_footer<S: RandomAccessSource>(
    source: &S,
    length: u64,
    postscript: &PostScript,
    postscript_length: u64,
    tail: &[u8],
) -> Result<Footer> {
    let footer_length = postscript.footer_length();
    let tail_length = 1 + postscript_length + footer_length;

    let footer_bytes: Cow<'_, [u8]> = if tail_length > tail.len() as u64 {
        // The first read missed part of the footer, read its whole range again
        debug!(
            name = source.name(),
            tail_length,
            read = tail.len(),
            "Tail guess too small, rereading footer"
        );
        Cow::Owned(read_range(source, length - tail_length, footer_length)?)
    } else {
        let start = tail.len() - tail_length as usize;
        Cow::Borrowed(&tail[start..start + footer_length as usize])
    };

    let compression = Compression::from_raw(postscript.compression);
    let decoded = read_section(&footer_bytes, compression, postscript.compression_block_size)?;
    Footer::decode(&*decoded).map_err(|e| OrcError::decode("footer", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_version_names() {
        assert_eq!(writer_version_name(0), "original");
        assert_eq!(writer_version_name(1), "HIVE-8732");
        assert_eq!(writer_version_name(4), "HIVE-13083");
        assert_eq!(writer_version_name(9), "ORC-14");
        assert_eq!(writer_version_name(6_000), "original");
    }

    #[test]
    fn test_read_options_default() {
        let options = ReadOptions::default();
        assert_eq!(options.tail_size_guess, 16 * 1024);
        assert!(options.tail_size_guess > 255);
    }
}
