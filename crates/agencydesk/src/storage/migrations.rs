//! Data directory versioning.
//!
//! The layout version lives in `meta.json`. Opening a data directory creates
//! any missing collection files, then steps the version forward one migration
//! at a time.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::codec::{self, FileFormat};
use super::schema::{CollectionFile, COLLECTION_FILES, COMMENTS_FILE, META_FILE};

/// The current layout version.
pub const CURRENT_VERSION: u32 = 2;

/// Contents of `meta.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMeta {
    /// Layout version of the data directory.
    pub schema_version: u32,
}

/// Prepare a data directory for use.
///
/// Creates missing collection files with empty contents, then runs pending
/// migrations. Returns the resulting version.
///
/// # Errors
///
/// Returns an error if the directory was written by a newer version or a
/// migration step fails.
pub fn initialize_layout(root: &Path) -> Result<u32> {
    for file in COLLECTION_FILES {
        ensure_collection_file(root, file)?;
    }

    let version = read_version(root)?;
    if version > CURRENT_VERSION {
        return Err(Error::DataMigration {
            message: format!(
                "data directory is at version {version}, newer than supported version {CURRENT_VERSION}"
            ),
        });
    }
    if version < CURRENT_VERSION {
        run_migrations(root, version)?;
    }
    Ok(CURRENT_VERSION)
}

/// Read the layout version. A missing `meta.json` means version 0.
///
/// # Errors
///
/// Returns an error if `meta.json` exists but is unreadable or malformed.
pub fn read_version(root: &Path) -> Result<u32> {
    let path = root.join(META_FILE);
    match std::fs::read(&path) {
        Ok(bytes) => {
            let meta: LayoutMeta = serde_json::from_slice(&bytes).map_err(|e| {
                Error::DataMigration {
                    message: format!("invalid {META_FILE}: {e}"),
                }
            })?;
            Ok(meta.schema_version)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(Error::FileRead { path, source }),
    }
}

fn write_version(root: &Path, version: u32) -> Result<()> {
    let meta = LayoutMeta {
        schema_version: version,
    };
    let mut bytes = serde_json::to_vec_pretty(&meta)?;
    bytes.push(b'\n');
    codec::write_atomic(&root.join(META_FILE), &bytes)
}

fn ensure_collection_file(root: &Path, file: &CollectionFile) -> Result<()> {
    let path = root.join(file.file_name);
    if path.exists() {
        return Ok(());
    }
    let empty: [serde_json::Value; 0] = [];
    let bytes = codec::encode(file.format, file.columns, &empty)?;
    codec::write_atomic(&path, &bytes)?;
    debug!(collection = file.name, path = %path.display(), "Created collection file");
    Ok(())
}

fn run_migrations(root: &Path, from_version: u32) -> Result<()> {
    let mut current = from_version;
    while current < CURRENT_VERSION {
        current += 1;
        run_migration(root, current)?;
        write_version(root, current)?;
        info!(version = current, "Migrated data directory");
    }
    Ok(())
}

/// Step the layout up to `version`.
///
/// Version 1 is the initial layout. Its files are the ones
/// `ensure_collection_file` creates, so reaching it only records the version.
fn run_migration(root: &Path, version: u32) -> Result<()> {
    match version {
        1 => Ok(()),
        2 => migrate_v2(root),
        _ => Err(Error::DataMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Version 2 moved comments out of `comments.csv` into `comments.json`.
///
/// Rows from a leftover `comments.csv` are appended to the JSON collection and
/// the CSV file is removed.
fn migrate_v2(root: &Path) -> Result<()> {
    let legacy = root.join("comments.csv");
    if !legacy.exists() {
        return Ok(());
    }

    let json_path = root.join(COMMENTS_FILE);
    let legacy_rows: Vec<crate::model::BlogComment> =
        codec::read_records(&legacy, FileFormat::Csv)?;
    let mut comments: Vec<crate::model::BlogComment> =
        codec::read_records(&json_path, FileFormat::Json)?;

    let moved = legacy_rows.len();
    for row in legacy_rows {
        if !comments.iter().any(|c| c.id == row.id) {
            comments.push(row);
        }
    }
    codec::write_records(&json_path, FileFormat::Json, &[], &comments)?;
    std::fs::remove_file(&legacy).map_err(|source| Error::FileWrite {
        path: legacy.clone(),
        source,
    })?;
    info!(moved, "Moved legacy comments.csv into {}", COMMENTS_FILE);
    Ok(())
}
