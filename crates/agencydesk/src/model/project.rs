//! Portfolio projects shown on the work gallery.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{list_field, PublishStatus, Record};

/// A portfolio case study as stored in `projects.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: String,
    /// Project name.
    pub title: String,
    /// URL slug, unique among projects.
    pub slug: String,
    /// Client name.
    pub client: String,
    /// One-line summary for gallery cards.
    pub summary: String,
    /// Sanitized rich-text case study.
    pub description: String,
    /// Gallery filter category.
    pub category: String,
    /// Services delivered.
    #[serde(deserialize_with = "list_field::deserialize")]
    pub services: Vec<String>,
    /// Card image URL.
    pub cover_image: Option<String>,
    /// Additional image URLs.
    #[serde(deserialize_with = "list_field::deserialize")]
    pub gallery: Vec<String>,
    /// Live site link.
    pub project_url: Option<String>,
    /// Delivery year.
    pub year: Option<u16>,
    /// Highlighted on the home page.
    pub featured: bool,
    /// Publication state.
    pub status: PublishStatus,
    /// Manual ordering within the gallery; lower first.
    pub sort_order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Record for Project {
    const COLLECTION: &'static str = "projects";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "slug",
        "client",
        "summary",
        "description",
        "category",
        "services",
        "cover_image",
        "gallery",
        "project_url",
        "year",
        "featured",
        "status",
        "sort_order",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Project {
    /// Whether the project is visible on the public site.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PublishStatus::Published
    }

    /// Gallery order: featured first, then `sort_order`, then newest.
    #[must_use]
    pub fn gallery_order(a: &Self, b: &Self) -> Ordering {
        b.featured
            .cmp(&a.featured)
            .then(a.sort_order.cmp(&b.sort_order))
            .then(b.created_at.cmp(&a.created_at))
    }
}

/// Editor payload for creating or replacing a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    /// Project name.
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    /// Client name.
    pub client: String,
    /// One-line summary; derived from the description when absent.
    pub summary: Option<String>,
    /// Rich-text HTML from the editor.
    pub description: String,
    /// Gallery filter category.
    pub category: String,
    /// Services delivered.
    pub services: Vec<String>,
    /// Card image URL.
    pub cover_image: Option<String>,
    /// Additional image URLs.
    pub gallery: Vec<String>,
    /// Live site link.
    pub project_url: Option<String>,
    /// Delivery year.
    pub year: Option<u16>,
    /// Highlight on the home page.
    pub featured: Option<bool>,
    /// Requested publication state (defaults to draft).
    pub status: Option<PublishStatus>,
    /// Manual ordering within the gallery.
    pub sort_order: Option<i32>,
}
