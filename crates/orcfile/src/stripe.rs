//! Lazy access to stripe footers
//!
//! A stripe is stored as its index streams, then its data streams, then its
//! footer. The footer describes the column encodings and the physical stream
//! layout, so stream offsets can be derived without touching the data.

use prost::Message;
use tracing::debug;

use crate::decompress::read_section;
use crate::error::{OrcError, Result};
use crate::proto::{stream, StripeFooter, StripeInformation};
use crate::reader::OrcFile;
use crate::source::{read_range, RandomAccessSource};

/// Absolute offset of the stripe footer: right after the index and data sections
pub fn stripe_footer_offset(stripe: &StripeInformation) -> Option<u64> {
    stripe
        .offset()
        .checked_add(stripe.index_length())?
        .checked_add(stripe.data_length())
}

/// Absolute offset one past the stripe's last byte
pub fn stripe_end(stripe: &StripeInformation) -> Option<u64> {
    stripe_footer_offset(stripe)?.checked_add(stripe.footer_length())
}

/// Physical location of one stream inside a stripe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLocation {
    pub column: u32,
    pub kind: stream::Kind,
    pub offset: u64,
    pub length: u64,
}

/// Derives each stream's absolute offset as a running sum of the stream lengths.
///
/// The sum starts at the stripe offset, where the index streams begin.
/// Streams are stored back to back, so a well-formed footer's last stream
/// ends where the stripe footer begins.
pub fn stream_layout(stripe: &StripeInformation, footer: &StripeFooter) -> Vec<StreamLocation> {
    let mut offset = stripe.offset();
    footer
        .streams
        .iter()
        .map(|s| {
            let location = StreamLocation {
                column: s.column(),
                kind: s.kind(),
                offset,
                length: s.length(),
            };
            offset = offset.saturating_add(s.length());
            location
        })
        .collect()
}

impl<S: RandomAccessSource> OrcFile<S> {
    /// Reads and decodes the footer of one stripe.
    ///
    /// The result is not cached; callers needing it repeatedly should keep it.
    pub fn stripe_footer(&self, stripe: &StripeInformation) -> Result<StripeFooter> {
        let start = stripe_footer_offset(stripe)
            .ok_or_else(|| OrcError::InvalidLayout("stripe footer offset overflows".to_string()))?;
        let length = stripe.footer_length();
        if start.saturating_add(length) > self.length() {
            return Err(OrcError::InvalidLayout(format!(
                "stripe footer at {} ({} bytes) extends past end of file ({} bytes)",
                start,
                length,
                self.length()
            )));
        }
        debug!(name = self.name(), start, length, "Reading stripe footer");

        let bytes = read_range(self.source(), start, length)?;
        let decoded = read_section(&bytes, self.compression(), self.compression_block_size())?;
        StripeFooter::decode(&*decoded).map_err(|e| OrcError::decode("stripe footer", e))
    }

    /// Reads the footer of the stripe with the given ordinal
    pub fn stripe_footer_at(&self, index: usize) -> Result<StripeFooter> {
        let stripes = self.stripes();
        let stripe = stripes.get(index).ok_or(OrcError::StripeOutOfRange {
            index,
            total: stripes.len(),
        })?;
        self.stripe_footer(stripe)
    }
}
