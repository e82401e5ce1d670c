//! Builds synthetic ORC files for tests
//!
//! Stripe contents are filler bytes; only the structural sections (stripe
//! footers, metadata, footer, postscript) are real, encoded and framed the
//! way a writer lays them out.

#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use orcfile::proto::{
    column_encoding, r#type, stream, ColumnEncoding, ColumnStatistics,
    CompressionKind, Footer, IntegerStatistics, Metadata, PostScript, Stream, StringStatistics,
    StripeFooter, StripeInformation, StripeStatistics, Type, UserMetadataItem,
};
use orcfile::{InMemorySource, RandomAccessSource};
use prost::Message;

/// Codec used to frame the structural sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    None,
    Zlib,
    Snappy,
    /// Declared as the given kind, but every chunk stored as original
    Original(CompressionKind),
}

impl Codec {
    fn kind(&self) -> i32 {
        match self {
            Codec::None => CompressionKind::None as i32,
            Codec::Zlib => CompressionKind::Zlib as i32,
            Codec::Snappy => CompressionKind::Snappy as i32,
            Codec::Original(kind) => *kind as i32,
        }
    }
}

/// Frames `payload` as a single chunk
pub fn chunk(payload: &[u8], is_original: bool) -> Vec<u8> {
    let value = ((payload.len() as u32) << 1) | is_original as u32;
    let mut out = value.to_le_bytes()[..3].to_vec();
    out.extend_from_slice(payload);
    out
}

/// Encodes a section the way it is stored under `codec`
pub fn encode_section(payload: &[u8], codec: Codec) -> Vec<u8> {
    match codec {
        Codec::None => payload.to_vec(),
        Codec::Zlib => {
            let mut encoder =
                flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(payload).unwrap();
            chunk(&encoder.finish().unwrap(), false)
        }
        Codec::Snappy => {
            let compressed = snap::raw::Encoder::new().compress_vec(payload).unwrap();
            chunk(&compressed, false)
        }
        Codec::Original(_) => chunk(payload, true),
    }
}

/// Description of a synthetic file
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub codec: Codec,
    /// Rows per stripe
    pub stripes: Vec<u64>,
    /// Bytes of filler per stream; each stripe gets one index and one data stream per column
    pub stream_length: u64,
    pub with_metadata: bool,
    /// Extra user metadata payload, used to inflate the footer
    pub padding: usize,
    pub writer_version: Option<u32>,
    pub magic: String,
    /// Compression number written to the postscript instead of the codec's own
    pub declared_compression: Option<i32>,
}

impl Default for FileSpec {
    fn default() -> Self {
        Self {
            codec: Codec::None,
            stripes: vec![1_000, 1_000, 500],
            stream_length: 64,
            with_metadata: true,
            padding: 0,
            writer_version: Some(4),
            magic: "ORC".to_string(),
            declared_compression: None,
        }
    }
}

/// Number of types in the synthetic schema: struct<id:bigint,name:string>
pub const TYPE_COUNT: usize = 3;

pub fn schema() -> Vec<Type> {
    vec![
        Type {
            kind: Some(r#type::Kind::Struct as i32),
            subtypes: vec![1, 2],
            field_names: vec!["id".to_string(), "name".to_string()],
            ..Default::default()
        },
        Type {
            kind: Some(r#type::Kind::Long as i32),
            ..Default::default()
        },
        Type {
            kind: Some(r#type::Kind::String as i32),
            ..Default::default()
        },
    ]
}

pub fn column_statistics(rows: u64) -> Vec<ColumnStatistics> {
    vec![
        ColumnStatistics {
            number_of_values: Some(rows),
            ..Default::default()
        },
        ColumnStatistics {
            number_of_values: Some(rows),
            int_statistics: Some(IntegerStatistics {
                minimum: Some(0),
                maximum: Some(rows as i64 - 1),
                sum: Some((rows * rows.saturating_sub(1) / 2) as i64),
            }),
            has_null: Some(false),
            ..Default::default()
        },
        ColumnStatistics {
            number_of_values: Some(rows),
            string_statistics: Some(StringStatistics {
                minimum: Some("alpha".to_string()),
                maximum: Some("omega".to_string()),
                sum: Some(rows as i64 * 5),
            }),
            ..Default::default()
        },
    ]
}

/// A built file plus the facts the tests check against
pub struct Built {
    pub bytes: Vec<u8>,
    pub footer: Footer,
    pub postscript: PostScript,
    pub stripe_footers: Vec<StripeFooter>,
    pub postscript_length: usize,
}

fn stripe_footer(stream_length: u64) -> StripeFooter {
    let mut streams = Vec::new();
    for column in 0..TYPE_COUNT as u32 {
        streams.push(Stream {
            kind: Some(stream::Kind::RowIndex as i32),
            column: Some(column),
            length: Some(stream_length),
        });
    }
    for column in 1..TYPE_COUNT as u32 {
        streams.push(Stream {
            kind: Some(stream::Kind::Data as i32),
            column: Some(column),
            length: Some(stream_length),
        });
    }
    StripeFooter {
        streams,
        columns: vec![
            ColumnEncoding {
                kind: Some(column_encoding::Kind::Direct as i32),
                dictionary_size: None,
            },
            ColumnEncoding {
                kind: Some(column_encoding::Kind::DirectV2 as i32),
                dictionary_size: None,
            },
            ColumnEncoding {
                kind: Some(column_encoding::Kind::DictionaryV2 as i32),
                dictionary_size: Some(12),
            },
        ],
        writer_timezone: Some("UTC".to_string()),
    }
}

/// Lays out header, stripes, metadata, footer, postscript and its length byte
pub fn build(desc: &FileSpec) -> Built {
    let mut bytes = b"ORC".to_vec();
    let mut stripes = Vec::new();
    let mut stripe_footers = Vec::new();

    let index_length = desc.stream_length * TYPE_COUNT as u64;
    let data_length = desc.stream_length * (TYPE_COUNT as u64 - 1);

    for (i, rows) in desc.stripes.iter().enumerate() {
        let offset = bytes.len() as u64;
        bytes.extend(std::iter::repeat(i as u8).take((index_length + data_length) as usize));

        let footer = stripe_footer(desc.stream_length);
        let encoded = encode_section(&footer.encode_to_vec(), desc.codec);
        bytes.extend_from_slice(&encoded);

        stripes.push(StripeInformation {
            offset: Some(offset),
            index_length: Some(index_length),
            data_length: Some(data_length),
            footer_length: Some(encoded.len() as u64),
            number_of_rows: Some(*rows),
        });
        stripe_footers.push(footer);
    }
    let content_length = bytes.len() as u64 - 3;

    let metadata_length = if desc.with_metadata {
        let metadata = Metadata {
            stripe_stats: desc
                .stripes
                .iter()
                .map(|rows| StripeStatistics {
                    col_stats: column_statistics(*rows),
                })
                .collect(),
        };
        let encoded = encode_section(&metadata.encode_to_vec(), desc.codec);
        bytes.extend_from_slice(&encoded);
        Some(encoded.len() as u64)
    } else {
        None
    };

    let total_rows: u64 = desc.stripes.iter().sum();
    let mut user_metadata = vec![UserMetadataItem {
        name: Some("created.by".to_string()),
        value: Some(b"orcfile tests".to_vec()),
    }];
    if desc.padding > 0 {
        // Varied bytes so the footer stays large once compressed
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let noise = (0..desc.padding)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect();
        user_metadata.push(UserMetadataItem {
            name: Some("padding".to_string()),
            value: Some(noise),
        });
    }

    let footer = Footer {
        header_length: Some(3),
        content_length: Some(content_length),
        stripes,
        types: schema(),
        metadata: user_metadata,
        number_of_rows: Some(total_rows),
        statistics: column_statistics(total_rows),
        row_index_stride: Some(10_000),
    };
    let encoded_footer = encode_section(&footer.encode_to_vec(), desc.codec);
    bytes.extend_from_slice(&encoded_footer);

    let postscript = PostScript {
        footer_length: Some(encoded_footer.len() as u64),
        compression: Some(desc.declared_compression.unwrap_or_else(|| desc.codec.kind())),
        compression_block_size: match desc.codec {
            Codec::None => None,
            _ => Some(256 * 1024),
        },
        version: vec![0, 12],
        metadata_length,
        writer_version: desc.writer_version,
        magic: Some(desc.magic.clone()),
    };
    let encoded_postscript = postscript.encode_to_vec();
    assert!(encoded_postscript.len() < 256);
    bytes.extend_from_slice(&encoded_postscript);
    bytes.push(encoded_postscript.len() as u8);

    Built {
        bytes,
        footer,
        postscript,
        stripe_footers,
        postscript_length: encoded_postscript.len(),
    }
}

pub fn in_memory(built: &Built, name: &str) -> InMemorySource {
    InMemorySource::new(name, built.bytes.clone())
}

/// Wraps a source, counting reads and recording whether it was closed
pub struct TrackingSource<S> {
    inner: S,
    pub reads: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
}

impl<S> TrackingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<S: RandomAccessSource> RandomAccessSource for TrackingSource<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_at(buf, offset)
    }

    fn len(&self) -> std::io::Result<u64> {
        self.inner.len()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn close(self) -> std::io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close()
    }
}
