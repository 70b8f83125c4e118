//! Core record types for agencydesk.
//!
//! Every persisted entity implements [`Record`], which ties it to a collection
//! file and fixes its CSV column order.

pub mod admin_user;
pub mod blog;
pub mod comment;
pub mod enquiry;
pub mod project;

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use admin_user::{AdminProfile, AdminRole, AdminUser, AdminUserPatch, NewAdminUser};
pub use blog::{BlogPost, BlogPostInput};
pub use comment::{BlogComment, CommentStatus, NewComment, PublicComment};
pub use enquiry::{Enquiry, EnquiryPatch, EnquiryStatus, NewEnquiry};
pub use project::{Project, ProjectInput};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// A flat record stored in one collection file.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, used in errors, logs and exports.
    const COLLECTION: &'static str;

    /// CSV header, in struct field order.
    const COLUMNS: &'static [&'static str];

    /// The record's unique id.
    fn id(&self) -> &str;
}

/// Publication state shared by posts and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    /// Visible only in the admin console.
    #[default]
    Draft,
    /// Visible on the public site.
    Published,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

/// A page of results from a listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    /// Page size that was applied.
    pub per_page: usize,
    /// Total number of matching records.
    pub total: usize,
    /// Number of pages at this page size.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice one page out of an already filtered and sorted list.
    ///
    /// `page` is clamped to at least 1 and `per_page` to at least 1.
    #[must_use]
    pub fn paginate(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = all.len();
        let total_pages = total.div_ceil(per_page);
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Generate a fresh record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trim a required text field, rejecting blanks and over-long values.
///
/// # Errors
///
/// Returns a validation error naming `field`.
pub fn required(field: &'static str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(Error::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
///
/// # Errors
///
/// Returns a validation error when the value is too long.
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max_chars => Err(Error::validation(
            field,
            format!("must be at most {max_chars} characters"),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Normalize and check an email address.
///
/// # Errors
///
/// Returns a validation error when the address is malformed.
pub fn normalize_email(field: &'static str, value: &str) -> Result<String> {
    let email = value.trim().to_lowercase();
    if email.len() > 254 || !EMAIL_RE.is_match(&email) {
        return Err(Error::validation(field, "must be a valid email address"));
    }
    Ok(email)
}

/// List fields stored as one `|`-joined cell in CSV files.
///
/// Records serialize lists as plain sequences, so JSON carries arrays. The CSV
/// codec joins sequence values into a cell on write; on read this module
/// accepts either the joined cell or a sequence.
pub mod list_field {
    use std::fmt;

    use serde::de::{SeqAccess, Visitor};
    use serde::Deserializer;

    /// Separator between items inside one CSV cell.
    pub const SEPARATOR: char = '|';

    /// Split a cell into items, trimming and dropping empty segments.
    #[must_use]
    pub fn split(cell: &str) -> Vec<String> {
        cell.split(SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Join items into one cell.
    ///
    /// A lone item that would read back as a number or boolean gets a
    /// trailing separator so it stays text.
    #[must_use]
    pub fn join(items: &[String]) -> String {
        let mut cell = items.join(&*SEPARATOR.encode_utf8(&mut [0; 4]));
        if let [only] = items {
            if only == "true" || only == "false" || only.parse::<f64>().is_ok() {
                cell.push(SEPARATOR);
            }
        }
        cell
    }

    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of strings or a |-separated string")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(split(v))
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_i128<E: serde::de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(items)
        }
    }

    /// Read a list from a joined cell or a sequence.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        deserializer.deserialize_any(ListVisitor)
    }
}
