//! Parses one delimited source into a [`SourceFragment`].
//!
//! The reader never enforces a schema: it reports whatever header it finds.
//! Row shape policy is fixed so the same bytes always yield the same records:
//!
//! - empty cells become [`Value::Missing`];
//! - rows shorter than the header are padded with `Missing`;
//! - rows longer than the header are dropped and counted in
//!   [`SourceFragment::dropped_rows`].

use std::io::Read;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, warn};
use serde::Serialize;

use crate::{data::Value, io_utils};

/// Identifies the source a record came from. Its position in upload order is
/// carried by [`crate::dataset::Record::source`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceTag {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: encoding_rs::UTF_8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFragment {
    pub tag: SourceTag,
    pub columns: Vec<String>,
    /// Rows aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
    pub dropped_rows: usize,
}

impl SourceFragment {
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn read_source<R: Read>(
    input: R,
    tag: SourceTag,
    options: &SourceOptions,
) -> Result<SourceFragment> {
    let mut reader = io_utils::open_csv_reader(input, options.delimiter, true);
    let columns = io_utils::reader_headers(&mut reader, options.encoding)
        .with_context(|| format!("Reading header of source '{}'", tag.name))?;
    let width = columns.len();

    let mut rows = Vec::new();
    let mut dropped_rows = 0usize;
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record
            .with_context(|| format!("Reading row {} of source '{}'", row_idx + 2, tag.name))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {} of source '{}'", row_idx + 2, tag.name))?;
        if decoded.len() > width {
            warn!(
                "Dropping row {} of source '{}': {} field(s) for {} column(s)",
                row_idx + 2,
                tag.name,
                decoded.len(),
                width
            );
            dropped_rows += 1;
            continue;
        }
        let mut row = decoded
            .iter()
            .map(|cell| Value::from_raw(cell))
            .collect::<Vec<_>>();
        row.resize(width, Value::Missing);
        rows.push(row);
    }

    debug!(
        "Source '{}' yielded {} record(s) across {} column(s)",
        tag.name,
        rows.len(),
        width
    );
    Ok(SourceFragment {
        tag,
        columns,
        rows,
        dropped_rows,
    })
}
