//! Storage layer for agencydesk.
//!
//! Every entity lives in its own flat file inside the data directory. A
//! mutation reads the whole file, edits the parsed records and writes the whole
//! file back through an atomic rename.

pub mod codec;
pub mod collection;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{AdminUser, BlogComment, BlogPost, Enquiry, Project};

pub use codec::FileFormat;
pub use collection::Collection;

use schema::{ADMIN_USERS_FILE, BLOGS_FILE, COMMENTS_FILE, ENQUIRIES_FILE, PROJECTS_FILE};

/// Every collection of the site, rooted at one data directory.
#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
    schema_version: u32,
    /// Blog posts.
    pub blogs: Collection<BlogPost>,
    /// Portfolio projects.
    pub projects: Collection<Project>,
    /// Contact form leads.
    pub enquiries: Collection<Enquiry>,
    /// Admin accounts.
    pub users: Collection<AdminUser>,
    /// Blog comments.
    pub comments: Collection<BlogComment>,
}

impl Storage {
    /// Open or create a data directory.
    ///
    /// Creates the directory and any missing collection files, then brings the
    /// layout up to the current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or migrated.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreate {
                path: root.clone(),
                source,
            })?;
            debug!("Created data directory {}", root.display());
        }

        let schema_version = migrations::initialize_layout(&root)?;

        let storage = Self {
            blogs: Collection::new(root.join(BLOGS_FILE), FileFormat::Csv),
            projects: Collection::new(root.join(PROJECTS_FILE), FileFormat::Csv),
            enquiries: Collection::new(root.join(ENQUIRIES_FILE), FileFormat::Csv),
            users: Collection::new(root.join(ADMIN_USERS_FILE), FileFormat::Csv),
            comments: Collection::new(root.join(COMMENTS_FILE), FileFormat::Json),
            root,
            schema_version,
        };

        info!("Data directory opened at {}", storage.root.display());
        Ok(storage)
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Layout version of the data directory.
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Per-collection record counts and file sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection file cannot be read.
    pub fn stats(&self) -> Result<StorageStats> {
        let collections = vec![
            collection_stats(&self.blogs)?,
            collection_stats(&self.projects)?,
            collection_stats(&self.enquiries)?,
            collection_stats(&self.users)?,
            collection_stats(&self.comments)?,
        ];

        Ok(StorageStats {
            data_dir: self.root.clone(),
            schema_version: self.schema_version,
            collections,
        })
    }
}

fn collection_stats<T: crate::model::Record>(collection: &Collection<T>) -> Result<CollectionStats> {
    Ok(CollectionStats {
        name: T::COLLECTION,
        path: collection.path().to_path_buf(),
        records: collection.count()?,
        bytes: collection.size_bytes(),
    })
}

/// Statistics about the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Path to the data directory.
    pub data_dir: PathBuf,
    /// Layout version.
    pub schema_version: u32,
    /// One entry per collection.
    pub collections: Vec<CollectionStats>,
}

impl StorageStats {
    /// Total records across every collection.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.records).sum()
    }

    /// Total bytes on disk across every collection file.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.collections.iter().map(|c| c.bytes).sum()
    }
}

/// Statistics about one collection file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: &'static str,
    /// Path to the collection file.
    pub path: PathBuf,
    /// Number of records.
    pub records: usize,
    /// File size in bytes.
    pub bytes: u64,
}
