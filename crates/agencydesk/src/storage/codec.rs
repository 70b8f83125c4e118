//! Whole-file encoding for collection files.
//!
//! A collection is always read and written in one piece. Writes go to a
//! temporary sibling file that is renamed over the target, so readers never
//! observe a half-written file.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::list_field;

/// On-disk representation of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Header row plus one row per record.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl FileFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Encode rows as CSV under an explicit header.
///
/// The header is written even when `rows` is empty.
///
/// # Errors
///
/// Returns an error if a row cannot be serialized.
pub fn encode_csv<R: Serialize>(columns: &[&str], rows: &[R]) -> Result<Vec<u8>> {
    encode_csv_with(columns, rows, |cell| cell)
}

/// Encode rows as CSV, passing every data cell through `map_cell`.
///
/// # Errors
///
/// Returns an error if a row cannot be serialized.
pub fn encode_csv_with<R, F>(columns: &[&str], rows: &[R], map_cell: F) -> Result<Vec<u8>>
where
    R: Serialize,
    F: Fn(String) -> String,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        let cells = row_cells(columns, row)?;
        writer.write_record(cells.into_iter().map(&map_cell))?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Flatten one row into cells, in `columns` order.
///
/// Sequences become one `|`-joined cell; absent values become empty cells.
fn row_cells<R: Serialize>(columns: &[&str], row: &R) -> Result<Vec<String>> {
    let Value::Object(mut fields) = serde_json::to_value(row)? else {
        return Err(Error::internal("CSV row did not serialize to a map"));
    };
    Ok(columns
        .iter()
        .map(|column| cell_text(fields.remove(*column).unwrap_or(Value::Null)))
        .collect())
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => {
            let items: Vec<String> = items.into_iter().map(cell_text).collect();
            list_field::join(&items)
        }
        other => other.to_string(),
    }
}

/// Decode CSV rows, matching fields by header name.
///
/// # Errors
///
/// Returns an error if any row fails to deserialize.
pub fn decode_csv<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

/// Encode records in the given format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode<T: Serialize>(format: FileFormat, columns: &[&str], records: &[T]) -> Result<Vec<u8>> {
    match format {
        FileFormat::Csv => encode_csv(columns, records),
        FileFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(records)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
    }
}

/// Decode records in the given format. Blank input is an empty collection.
///
/// # Errors
///
/// Returns an error if the content is malformed.
pub fn decode<T: DeserializeOwned>(format: FileFormat, bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match format {
        FileFormat::Csv => decode_csv(bytes),
        FileFormat::Json => Ok(serde_json::from_slice(bytes)?),
    }
}

/// Read and decode a collection file. A missing file is an empty collection.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded.
pub fn read_records<T: DeserializeOwned>(path: &Path, format: FileFormat) -> Result<Vec<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    decode(format, &bytes)
}

/// Encode and atomically replace a collection file.
///
/// # Errors
///
/// Returns an error if encoding or any filesystem step fails.
pub fn write_records<T: Serialize>(
    path: &Path,
    format: FileFormat,
    columns: &[&str],
    records: &[T],
) -> Result<()> {
    let bytes = encode(format, columns, records)?;
    write_atomic(path, &bytes)
}

/// Replace `path` with `bytes` via a temp file and rename.
///
/// # Errors
///
/// Returns [`Error::FileWrite`] if any step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let to_write_error = |source: std::io::Error| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(to_write_error)?;
    tmp.write_all(bytes).map_err(to_write_error)?;
    tmp.as_file().sync_all().map_err(to_write_error)?;
    tmp.persist(path).map_err(|e| to_write_error(e.error))?;
    Ok(())
}
