//! Column statistics carried by the footer and the metadata section
//!
//! The message schema stores one optional sub-record per data type. Here the
//! populated sub-record is picked once, at conversion time, and exposed as a
//! single [`TypedStatistics`] variant.

use crate::proto;

/// Statistics for one column, either file-wide or for a single stripe
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    /// Number of non-null values
    pub number_of_values: u64,

    /// Whether the column holds nulls, when the writer recorded it
    pub has_null: Option<bool>,

    /// Type-specific statistics, absent when the writer recorded none
    pub typed: Option<TypedStatistics>,
}

/// Type-specific statistics; exactly one variant per column
#[derive(Debug, Clone, PartialEq)]
pub enum TypedStatistics {
    Binary {
        total_length: Option<i64>,
    },
    Boolean {
        true_count: u64,
        false_count: u64,
    },
    /// Days since the epoch
    Date {
        minimum: Option<i32>,
        maximum: Option<i32>,
    },
    Decimal {
        minimum: Option<String>,
        maximum: Option<String>,
        sum: Option<String>,
    },
    Double {
        minimum: Option<f64>,
        maximum: Option<f64>,
        sum: Option<f64>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
        sum: Option<i64>,
    },
    String {
        minimum: Option<String>,
        maximum: Option<String>,
        total_length: Option<i64>,
    },
    /// Milliseconds since the epoch
    Timestamp {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
}

impl TypedStatistics {
    /// Human readable name of the data type the statistics describe
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedStatistics::Binary { .. } => "Binary",
            TypedStatistics::Boolean { .. } => "Boolean",
            TypedStatistics::Date { .. } => "Date",
            TypedStatistics::Decimal { .. } => "Decimal",
            TypedStatistics::Double { .. } => "Double",
            TypedStatistics::Integer { .. } => "Integer",
            TypedStatistics::String { .. } => "String",
            TypedStatistics::Timestamp { .. } => "Timestamp",
        }
    }
}

impl From<&proto::ColumnStatistics> for ColumnStats {
    fn from(stats: &proto::ColumnStatistics) -> Self {
        let number_of_values = stats.number_of_values.unwrap_or(0);
        Self {
            number_of_values,
            has_null: stats.has_null,
            typed: select_typed(stats, number_of_values),
        }
    }
}

fn select_typed(stats: &proto::ColumnStatistics, number_of_values: u64) -> Option<TypedStatistics> {
    if let Some(s) = &stats.binary_statistics {
        return Some(TypedStatistics::Binary {
            total_length: s.sum,
        });
    }
    if let Some(s) = &stats.bucket_statistics {
        let true_count = s.count.first().copied().unwrap_or(0);
        return Some(TypedStatistics::Boolean {
            true_count,
            false_count: number_of_values.saturating_sub(true_count),
        });
    }
    if let Some(s) = &stats.date_statistics {
        return Some(TypedStatistics::Date {
            minimum: s.minimum,
            maximum: s.maximum,
        });
    }
    if let Some(s) = &stats.decimal_statistics {
        return Some(TypedStatistics::Decimal {
            minimum: s.minimum.clone(),
            maximum: s.maximum.clone(),
            sum: s.sum.clone(),
        });
    }
    if let Some(s) = &stats.double_statistics {
        return Some(TypedStatistics::Double {
            minimum: s.minimum,
            maximum: s.maximum,
            sum: s.sum,
        });
    }
    if let Some(s) = &stats.int_statistics {
        return Some(TypedStatistics::Integer {
            minimum: s.minimum,
            maximum: s.maximum,
            sum: s.sum,
        });
    }
    if let Some(s) = &stats.string_statistics {
        return Some(TypedStatistics::String {
            minimum: s.minimum.clone(),
            maximum: s.maximum.clone(),
            total_length: s.sum,
        });
    }
    stats
        .timestamp_statistics
        .as_ref()
        .map(|s| TypedStatistics::Timestamp {
            minimum: s.minimum,
            maximum: s.maximum,
        })
}

/// Converts a list of raw column statistics in column order
pub fn convert_all(stats: &[proto::ColumnStatistics]) -> Vec<ColumnStats> {
    stats.iter().map(ColumnStats::from).collect()
}
