//! Generic CRUD over one collection file.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::Record;

use super::codec::{self, FileFormat};

/// One file-backed collection of records.
///
/// Every read parses the whole file. Every mutation goes through
/// [`Collection::mutate`], which holds the collection's write lock while it
/// reads, edits and rewrites the file. The lock only serializes writers inside
/// this process; another process writing the same file still races.
#[derive(Debug)]
pub struct Collection<T: Record> {
    path: PathBuf,
    format: FileFormat,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Bind a collection to a file. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding of the backing file.
    #[must_use]
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn all(&self) -> Result<Vec<T>> {
        let records = codec::read_records(&self.path, self.format)?;
        trace!(collection = T::COLLECTION, count = records.len(), "Loaded collection");
        Ok(records)
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn get(&self, id: &str) -> Result<Option<T>> {
        self.find(|r| r.id() == id)
    }

    /// Look up a record by id, failing with [`Error::NotFound`] if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or the file is unreadable.
    pub fn require(&self, id: &str) -> Result<T> {
        self.get(id)?
            .ok_or_else(|| Error::not_found(T::COLLECTION, id))
    }

    /// First record matching `pred`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Result<Option<T>> {
        Ok(self.all()?.into_iter().find(|r| pred(r)))
    }

    /// All records matching `pred`, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        Ok(self.all()?.into_iter().filter(|r| pred(r)).collect())
    }

    /// Number of records.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    /// Read-modify-write the whole collection.
    ///
    /// The closure sees every record. If it returns `Ok`, the edited list is
    /// written back; if it returns `Err`, the file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if reading or writing fails.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::internal(format!("{} write lock poisoned", T::COLLECTION)))?;

        let mut records = self.all()?;
        let out = f(&mut records)?;
        codec::write_records(&self.path, self.format, T::COLUMNS, &records)?;
        debug!(
            collection = T::COLLECTION,
            count = records.len(),
            "Rewrote collection file"
        );
        Ok(out)
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the id is already taken.
    pub fn insert(&self, record: T) -> Result<T> {
        self.mutate(|records| {
            if records.iter().any(|r| r.id() == record.id()) {
                return Err(Error::conflict(format!(
                    "{} already contains id {}",
                    T::COLLECTION,
                    record.id()
                )));
            }
            records.push(record.clone());
            Ok(record)
        })
    }

    /// Edit one record in place and return the updated copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is missing, or the closure's error.
    pub fn update(&self, id: &str, f: impl FnOnce(&mut T) -> Result<()>) -> Result<T> {
        self.mutate(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Error::not_found(T::COLLECTION, id))?;
            f(record)?;
            Ok(record.clone())
        })
    }

    /// Edit every record whose id is in `ids`. Returns how many matched.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn update_many(&self, ids: &[String], mut f: impl FnMut(&mut T)) -> Result<usize> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.mutate(|records| {
            let mut touched = 0;
            for record in records.iter_mut().filter(|r| wanted.contains(r.id())) {
                f(record);
                touched += 1;
            }
            Ok(touched)
        })
    }

    /// Remove one record. Returns `false` if it was not there.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            Ok(records.len() < before)
        })
    }

    /// Remove every record whose id is in `ids`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn delete_many(&self, ids: &[String]) -> Result<usize> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| !doomed.contains(r.id()));
            Ok(before - records.len())
        })
    }

    /// Size of the backing file in bytes (0 if missing).
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}
