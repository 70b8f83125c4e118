//! CSV exports for the admin tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{AdminProfile, AdminUser, BlogComment, BlogPost, Enquiry, Project, Record};
use crate::storage::{codec, Collection, Storage};

/// A collection that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportCollection {
    /// Blog posts.
    Blogs,
    /// Portfolio projects.
    Projects,
    /// Contact form leads.
    Enquiries,
    /// Blog comments.
    Comments,
    /// Admin accounts, without password hashes.
    #[value(name = "admin_users")]
    AdminUsers,
}

impl ExportCollection {
    /// Every exportable collection.
    pub const ALL: [Self; 5] = [
        Self::Blogs,
        Self::Projects,
        Self::Enquiries,
        Self::Comments,
        Self::AdminUsers,
    ];

    /// Collection name, as used in URLs and file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blogs => BlogPost::COLLECTION,
            Self::Projects => Project::COLLECTION,
            Self::Enquiries => Enquiry::COLLECTION,
            Self::Comments => BlogComment::COLLECTION,
            Self::AdminUsers => AdminUser::COLLECTION,
        }
    }

    /// Suggested download file name.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for ExportCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportCollection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::not_found("exports", s))
    }
}

/// Leading characters that make a spreadsheet evaluate a cell.
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Quote cells that a spreadsheet would otherwise run as formulas.
fn spreadsheet_safe(cell: String) -> String {
    if cell.starts_with(FORMULA_PREFIXES) {
        format!("'{cell}")
    } else {
        cell
    }
}

fn encode_export<R: serde::Serialize>(columns: &[&str], rows: &[R]) -> Result<Vec<u8>> {
    codec::encode_csv_with(columns, rows, spreadsheet_safe)
}

fn export_records<T: Record>(collection: &Collection<T>) -> Result<(usize, Vec<u8>)> {
    let records = collection.all()?;
    Ok((records.len(), encode_export(T::COLUMNS, &records)?))
}

/// Render one collection as CSV with a header row.
///
/// Cells starting with a formula character are prefixed with `'`.
///
/// # Errors
///
/// Returns an error if the collection cannot be read or encoded.
pub fn export_csv(storage: &Storage, collection: ExportCollection) -> Result<Vec<u8>> {
    let (rows, bytes) = match collection {
        ExportCollection::Blogs => export_records(&storage.blogs)?,
        ExportCollection::Projects => export_records(&storage.projects)?,
        ExportCollection::Enquiries => export_records(&storage.enquiries)?,
        ExportCollection::Comments => export_records(&storage.comments)?,
        ExportCollection::AdminUsers => {
            let profiles: Vec<AdminProfile> =
                storage.users.all()?.iter().map(AdminUser::profile).collect();
            (
                profiles.len(),
                encode_export(AdminProfile::COLUMNS, &profiles)?,
            )
        }
    };
    info!(collection = %collection, rows, "Exported collection");
    Ok(bytes)
}
