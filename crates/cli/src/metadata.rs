//! JSON summary of a file's tail, printed by `orc-metadata`

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use orcfile::{stream_layout, OrcFile, RandomAccessSource};
use serde::Serialize;

/// Structural summary of one ORC file
///
/// Fields are declared in key order so the output is stable.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub compression: String,
    #[serde(rename = "compression block")]
    pub compression_block: Option<u64>,
    pub content: u64,
    #[serde(rename = "file length")]
    pub file_length: u64,
    pub footer: u64,
    pub format: String,
    pub name: String,
    pub postscript: u64,
    #[serde(rename = "row index stride")]
    pub row_index_stride: u32,
    pub rows: u64,
    #[serde(rename = "stripe count")]
    pub stripe_count: usize,
    #[serde(rename = "stripe stats")]
    pub stripe_stats: u64,
    pub stripes: Vec<StripeSummary>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "user metadata")]
    pub user_metadata: BTreeMap<String, String>,
    #[serde(rename = "writer version")]
    pub writer_version: String,
}

#[derive(Debug, Serialize)]
pub struct StripeSummary {
    pub data: u64,
    pub encodings: Vec<EncodingSummary>,
    pub footer: u64,
    pub index: u64,
    pub length: u64,
    pub offset: u64,
    pub rows: u64,
    pub streams: Vec<StreamSummary>,
    pub stripe: usize,
}

#[derive(Debug, Serialize)]
pub struct EncodingSummary {
    pub column: usize,
    #[serde(rename = "dictionary size", skip_serializing_if = "Option::is_none")]
    pub dictionary_size: Option<u32>,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StreamSummary {
    pub column: u32,
    pub kind: &'static str,
    pub length: u64,
    pub offset: u64,
}

/// Collects the summary, reading every stripe footer.
pub fn summarize<S: RandomAccessSource>(file: &OrcFile<S>) -> Result<FileSummary> {
    let mut stripes = Vec::with_capacity(file.stripes().len());
    for (i, stripe) in file.stripes().iter().enumerate() {
        let footer = file
            .stripe_footer(stripe)
            .with_context(|| format!("Failed to read footer of stripe {}", i))?;

        let encodings = footer
            .columns
            .iter()
            .enumerate()
            .map(|(column, encoding)| EncodingSummary {
                column,
                dictionary_size: encoding.dictionary_size,
                kind: encoding.kind().as_str_name(),
            })
            .collect();

        let streams = stream_layout(stripe, &footer)
            .into_iter()
            .map(|s| StreamSummary {
                column: s.column,
                kind: s.kind.as_str_name(),
                length: s.length,
                offset: s.offset,
            })
            .collect();

        stripes.push(StripeSummary {
            data: stripe.data_length(),
            encodings,
            footer: stripe.footer_length(),
            index: stripe.index_length(),
            length: stripe
                .index_length()
                .saturating_add(stripe.data_length())
                .saturating_add(stripe.footer_length()),
            offset: stripe.offset(),
            rows: stripe.number_of_rows(),
            streams,
            stripe: i,
        });
    }

    let user_metadata = file
        .user_metadata()
        .iter()
        .map(|item| {
            let value = String::from_utf8_lossy(item.value.as_deref().unwrap_or_default());
            (item.name().to_string(), value.into_owned())
        })
        .collect();

    Ok(FileSummary {
        compression: file.compression().to_string().to_lowercase(),
        compression_block: file.compression_block_size(),
        content: file.content_length(),
        file_length: file.length(),
        footer: file.footer_length(),
        format: file.format_version(),
        name: file.name().to_string(),
        postscript: file.postscript_length(),
        row_index_stride: file.row_index_stride(),
        rows: file.number_of_rows(),
        stripe_count: file.stripes().len(),
        stripe_stats: file.metadata_length(),
        stripes,
        types: file
            .types()
            .iter()
            .map(|t| t.kind().as_str_name().to_lowercase())
            .collect(),
        user_metadata,
        writer_version: file.writer_version().to_string(),
    })
}

/// Renders the summary as JSON, indented when `pretty` is set
pub fn render<S: RandomAccessSource>(file: &OrcFile<S>, pretty: bool) -> Result<String> {
    let summary = summarize(file)?;
    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    Ok(json)
}
