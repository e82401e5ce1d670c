//! Error types for ORC tail and metadata operations

use thiserror::Error;

/// Result type for ORC operations
pub type Result<T> = std::result::Result<T, OrcError>;

/// Errors that can occur while resolving ORC structural metadata
#[derive(Error, Debug)]
pub enum OrcError {
    /// I/O error from the underlying source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source returned too few bytes to locate the postscript
    #[error("Failed to read enough of {name} to load tail: got {read} bytes")]
    TruncatedTail { name: String, read: usize },

    /// The postscript magic is not "ORC"
    #[error("Unexpected magic: {0:?}")]
    UnexpectedMagic(String),

    /// A compressed chunk uses a codec this reader cannot decode
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// The codec rejected the compressed bytes
    #[error("Failed to decompress {codec} chunk: {message}")]
    Decompression { codec: String, message: String },

    /// Message decoding failed for one of the structural sections
    #[error("Failed to decode {section}: {source}")]
    Decode {
        section: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// Declared section lengths or offsets do not fit inside the file
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Stripe ordinal outside the footer's stripe list
    #[error("Stripe index {index} out of bounds (total: {total})")]
    StripeOutOfRange { index: usize, total: usize },
}

impl OrcError {
    /// Returns true for failures of the underlying source
    pub fn is_io(&self) -> bool {
        matches!(self, OrcError::Io(_) | OrcError::TruncatedTail { .. })
    }

    /// Returns true for structural violations of the container format
    pub fn is_format(&self) -> bool {
        !self.is_io()
    }

    pub(crate) fn decode(section: &'static str, source: prost::DecodeError) -> Self {
        OrcError::Decode { section, source }
    }
}
