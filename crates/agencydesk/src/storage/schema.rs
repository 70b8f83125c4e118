//! File layout of the data directory.
//!
//! Each collection lives in one file. CSV collections carry a header row whose
//! columns come from the record type.

use crate::model::{AdminUser, BlogComment, BlogPost, Enquiry, Project, Record};

use super::codec::FileFormat;

/// Layout version marker file.
pub const META_FILE: &str = "meta.json";

/// Blog posts.
pub const BLOGS_FILE: &str = "blogs.csv";

/// Portfolio projects.
pub const PROJECTS_FILE: &str = "projects.csv";

/// Contact form leads.
pub const ENQUIRIES_FILE: &str = "enquiries.csv";

/// Admin accounts.
pub const ADMIN_USERS_FILE: &str = "admin_users.csv";

/// Blog comments.
pub const COMMENTS_FILE: &str = "comments.json";

/// Static description of one collection file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionFile {
    /// Collection name (matches [`Record::COLLECTION`]).
    pub name: &'static str,
    /// File name inside the data directory.
    pub file_name: &'static str,
    /// Encoding.
    pub format: FileFormat,
    /// CSV header.
    pub columns: &'static [&'static str],
}

/// Every collection file, in creation order.
pub const COLLECTION_FILES: &[CollectionFile] = &[
    CollectionFile {
        name: BlogPost::COLLECTION,
        file_name: BLOGS_FILE,
        format: FileFormat::Csv,
        columns: BlogPost::COLUMNS,
    },
    CollectionFile {
        name: Project::COLLECTION,
        file_name: PROJECTS_FILE,
        format: FileFormat::Csv,
        columns: Project::COLUMNS,
    },
    CollectionFile {
        name: Enquiry::COLLECTION,
        file_name: ENQUIRIES_FILE,
        format: FileFormat::Csv,
        columns: Enquiry::COLUMNS,
    },
    CollectionFile {
        name: AdminUser::COLLECTION,
        file_name: ADMIN_USERS_FILE,
        format: FileFormat::Csv,
        columns: AdminUser::COLUMNS,
    },
    CollectionFile {
        name: BlogComment::COLLECTION,
        file_name: COMMENTS_FILE,
        format: FileFormat::Json,
        columns: BlogComment::COLUMNS,
    },
];

/// Look up a collection file by collection name.
#[must_use]
pub fn collection_file(name: &str) -> Option<&'static CollectionFile> {
    COLLECTION_FILES.iter().find(|f| f.name == name)
}
