//! # orcfile
//!
//! Resolves the structural metadata of ORC files without decoding row data.
//!
//! This crate provides:
//! - Tail resolution: postscript and footer, with a single corrective reread
//!   when the initial tail guess is too small
//! - Decoding of the chunked compression framing (zlib, snappy, original chunks)
//! - Lazy stripe footer access and stream layout derivation
//! - File-level and stripe-level column statistics
//!
//! ## Example
//!
//! ```no_run
//! use orcfile::{OrcFile, ReadOptions};
//!
//! let file = OrcFile::open("data.orc", &ReadOptions::default()).unwrap();
//! println!("{} rows in {} stripes", file.number_of_rows(), file.stripes().len());
//!
//! for stripe in file.stripes() {
//!     let footer = file.stripe_footer(stripe).unwrap();
//!     println!("{} streams", footer.streams.len());
//! }
//!
//! file.close().unwrap();
//! ```

pub mod decompress;
pub mod error;
pub mod proto;
pub mod reader;
pub mod source;
pub mod statistics;
pub mod stripe;

pub use decompress::{decompress, decompress_bounded, ChunkHeader, Compression, MAX_CHUNK_LENGTH};
pub use error::{OrcError, Result};
pub use reader::{writer_version_name, OrcFile, ReadOptions, TAIL_SIZE_GUESS};
pub use source::{InMemorySource, LocalFile, RandomAccessSource};
pub use statistics::{ColumnStats, TypedStatistics};
pub use stripe::{stream_layout, stripe_footer_offset, StreamLocation};
