//! Reading and writing the on-disk record collection.
//!
//! The collection is a JSON array of records. Output is UTF-8 with non-ASCII
//! text kept as-is and two-space indentation, so the file stays readable and
//! diffs cleanly between runs.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::AppError;

/// Reads the whole collection into memory, preserving order.
///
/// Returns [`AppError::InputNotFound`] if `path` does not exist.
pub fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Err(AppError::InputNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| AppError::io(path, e))?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

/// Writes the collection to `path`, replacing any previous content.
///
/// The data goes to a temporary file in the destination directory first and is
/// then renamed over `path`, so an interrupted write never leaves a truncated
/// collection behind. Missing parent directories are created.
pub fn write_collection<T: Serialize>(path: &Path, records: &[T]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| AppError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush().map_err(|e| AppError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| AppError::io(path, e.error))?;

    Ok(())
}
