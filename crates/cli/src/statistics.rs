//! Plain text column statistics, printed by `orc-statistics`

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use orcfile::{ColumnStats, OrcFile, RandomAccessSource, TypedStatistics};

// 1970-01-01 counted in days from 0001-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Renders file-level statistics, then the statistics of every stripe.
///
/// A file without a metadata section still renders its file-level
/// statistics followed by a note that stripe statistics are absent.
pub fn render<S: RandomAccessSource>(file: &OrcFile<S>) -> Result<String> {
    let mut out = String::new();
    let name = file.name();

    let columns = file.statistics();
    writeln!(out, "{} has {} columns", name, columns.len())?;
    for (i, column) in columns.iter().enumerate() {
        writeln!(out, "*** Column {} ***", i)?;
        write_column(&mut out, column)?;
        writeln!(out)?;
    }

    let Some(stripes) = file.stripe_statistics()? else {
        writeln!(out, "{} has no stripe statistics", name)?;
        return Ok(out);
    };

    writeln!(out, "{} has {} stripes", name, stripes.len())?;
    for (i, stripe) in stripes.iter().enumerate() {
        writeln!(out, "*** Stripe {} ***\n", i)?;
        for (c, column) in stripe.iter().enumerate() {
            writeln!(out, "--- Column {} ---", c)?;
            write_column(&mut out, column)?;
            writeln!(out)?;
        }
    }
    Ok(out)
}

/// Writes one column's statistics block
pub fn write_column(out: &mut String, stats: &ColumnStats) -> std::fmt::Result {
    let Some(typed) = &stats.typed else {
        return writeln!(out, "Column has {} values", stats.number_of_values);
    };

    writeln!(out, "Data type: {}", typed.type_name())?;
    writeln!(out, "Values: {}", stats.number_of_values)?;
    match typed {
        TypedStatistics::Binary { total_length } => {
            write_field(out, "Total Length", total_length.as_ref())?;
        }
        TypedStatistics::Boolean {
            true_count,
            false_count,
        } => {
            writeln!(out, "(true: {}; false: {})", true_count, false_count)?;
        }
        TypedStatistics::Date { minimum, maximum } => {
            write_dated(out, "Minimum", *minimum, format_date)?;
            write_dated(out, "Maximum", *maximum, format_date)?;
        }
        TypedStatistics::Decimal {
            minimum,
            maximum,
            sum,
        } => {
            write_field(out, "Minimum", minimum.as_ref())?;
            write_field(out, "Maximum", maximum.as_ref())?;
            write_field(out, "Sum", sum.as_ref())?;
        }
        TypedStatistics::Double {
            minimum,
            maximum,
            sum,
        } => {
            for (label, value) in [("Minimum", minimum), ("Maximum", maximum), ("Sum", sum)] {
                if let Some(value) = value {
                    writeln!(out, "{}: {:.6}", label, value)?;
                }
            }
        }
        TypedStatistics::Integer {
            minimum,
            maximum,
            sum,
        } => {
            write_field(out, "Minimum", minimum.as_ref())?;
            write_field(out, "Maximum", maximum.as_ref())?;
            write_field(out, "Sum", sum.as_ref())?;
        }
        TypedStatistics::String {
            minimum,
            maximum,
            total_length,
        } => {
            write_field(out, "Minimum", minimum.as_ref())?;
            write_field(out, "Maximum", maximum.as_ref())?;
            write_field(out, "Total Length", total_length.as_ref())?;
        }
        TypedStatistics::Timestamp { minimum, maximum } => {
            write_dated(out, "Minimum", *minimum, format_timestamp)?;
            write_dated(out, "Maximum", *maximum, format_timestamp)?;
        }
    }
    Ok(())
}

// Absent values are left out
fn write_field<T: std::fmt::Display>(out: &mut String, label: &str, value: Option<&T>) -> std::fmt::Result {
    match value {
        Some(value) => writeln!(out, "{}: {}", label, value),
        None => Ok(()),
    }
}

fn write_dated<T: Copy + std::fmt::Display>(
    out: &mut String,
    label: &str,
    value: Option<T>,
    calendar: fn(T) -> Option<String>,
) -> std::fmt::Result {
    let Some(value) = value else {
        return Ok(());
    };
    match calendar(value) {
        Some(rendered) => writeln!(out, "{}: {} ({})", label, value, rendered),
        None => writeln!(out, "{}: {}", label, value),
    }
}

/// Days since the epoch as a calendar date
fn format_date(days: i32) -> Option<String> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Milliseconds since the epoch as a UTC timestamp
fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}
