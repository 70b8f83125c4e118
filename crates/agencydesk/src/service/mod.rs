//! Use-case layer between the HTTP handlers (or CLI) and storage.
//!
//! # Responsibility
//! - Validate and normalize input before it reaches a collection file.
//! - Enforce cross-record rules (unique slugs and emails, last-owner guard).
//! - Shape listings: filtering, ordering and pagination.
//!
//! # Invariants
//! - Rich text is sanitized on every write.
//! - Slug and email uniqueness are checked inside the collection's write lock.

pub mod blog_service;
pub mod comment_service;
pub mod dashboard_service;
pub mod enquiry_service;
pub mod export_service;
pub mod project_service;
pub mod user_service;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ContentConfig;
use crate::error::{Error, Result};
use crate::model::{list_field, optional};

pub use blog_service::{BlogQuery, BlogService};
pub use comment_service::CommentService;
pub use dashboard_service::{dashboard_stats, DashboardStats};
pub use enquiry_service::{EnquiryQuery, EnquiryService, SubmitOutcome};
pub use export_service::{export_csv, ExportCollection};
pub use project_service::{ProjectQuery, ProjectService};
pub use user_service::UserService;

/// Longest accepted URL field.
const MAX_URL_CHARS: usize = 2048;

/// Bulk action over posts or projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBulkAction {
    /// Remove the records.
    Delete,
    /// Make the records public.
    Publish,
    /// Move the records back to draft.
    Unpublish,
    /// Highlight the records.
    Feature,
    /// Remove the highlight.
    Unfeature,
}

/// Bulk action over enquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryBulkAction {
    /// Remove the leads.
    Delete,
    /// Move the leads to the request's `status`.
    SetStatus,
}

/// Bulk action over comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentBulkAction {
    /// Remove the comments.
    Delete,
    /// Show the comments publicly.
    Approve,
    /// Hide the comments.
    Reject,
}

/// Body of a bulk request from an admin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest<A> {
    /// What to do.
    pub action: A,
    /// Records to act on.
    pub ids: Vec<String>,
    /// Target stage for [`EnquiryBulkAction::SetStatus`].
    #[serde(default)]
    pub status: Option<crate::model::EnquiryStatus>,
}

/// Result of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Action that was applied.
    pub action: String,
    /// Distinct ids in the request.
    pub requested: usize,
    /// Records that were changed or removed.
    pub affected: usize,
}

impl BulkOutcome {
    fn new<A: Serialize>(action: A, requested: usize, affected: usize) -> Self {
        let action = serde_json::to_value(action)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        Self {
            action,
            requested,
            affected,
        }
    }
}

/// Trim, drop blanks and dedupe bulk ids.
///
/// # Errors
///
/// Returns a validation error when no ids remain.
pub fn clean_ids(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(String::from)
        .collect();
    if cleaned.is_empty() {
        return Err(Error::validation("ids", "must contain at least one id"));
    }
    Ok(cleaned)
}

/// Trim and dedupe a free-form list, keeping case and first-seen order.
///
/// # Errors
///
/// Returns a validation error if an item contains the list separator.
pub fn clean_list(field: &'static str, items: &[String]) -> Result<Vec<String>> {
    reject_separator(field, items)?;
    let mut seen = HashSet::new();
    Ok(items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(*s))
        .map(String::from)
        .collect())
}

/// List items are stored in one `|`-joined cell, so they cannot contain `|`.
///
/// # Errors
///
/// Returns a validation error naming `field`.
pub fn reject_separator(field: &'static str, items: &[String]) -> Result<()> {
    if items.iter().any(|item| item.contains(list_field::SEPARATOR)) {
        return Err(Error::validation(
            field,
            format!("items must not contain '{}'", list_field::SEPARATOR),
        ));
    }
    Ok(())
}

/// Optional http(s) URL field.
///
/// # Errors
///
/// Returns a validation error for other schemes or over-long values.
pub fn optional_url(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    let Some(url) = optional(field, value, MAX_URL_CHARS)? else {
        return Ok(None);
    };
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") || url.starts_with('/') {
        Ok(Some(url))
    } else {
        Err(Error::validation(field, "must be an http(s) URL or a site path"))
    }
}

/// Resolve requested paging against configured defaults and caps.
#[must_use]
pub fn page_params(
    content: &ContentConfig,
    page: Option<usize>,
    per_page: Option<usize>,
) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page
        .unwrap_or(content.default_per_page)
        .clamp(1, content.max_per_page.max(1));
    (page, per_page)
}

/// Case-insensitive equality on trimmed filter values.
fn same_label(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
