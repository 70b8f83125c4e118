//! Blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{list_field, PublishStatus, Record};

/// A blog post as stored in `blogs.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Unique identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// URL slug, unique among posts.
    pub slug: String,
    /// Plain-text teaser shown in listings.
    pub excerpt: String,
    /// Sanitized rich-text HTML body.
    pub content: String,
    /// Byline.
    pub author: String,
    /// Listing category.
    pub category: String,
    /// Normalized tags.
    #[serde(deserialize_with = "list_field::deserialize")]
    pub tags: Vec<String>,
    /// Hero image URL.
    pub cover_image: Option<String>,
    /// Publication state.
    pub status: PublishStatus,
    /// Pinned to the top of the blog index.
    pub featured: bool,
    /// Estimated reading time.
    pub reading_minutes: u32,
    /// First time the post went live.
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Record for BlogPost {
    const COLLECTION: &'static str = "blogs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "slug",
        "excerpt",
        "content",
        "author",
        "category",
        "tags",
        "cover_image",
        "status",
        "featured",
        "reading_minutes",
        "published_at",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

impl BlogPost {
    /// Whether the post is visible on the public site.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PublishStatus::Published
    }

    /// Move the post to `status`, stamping `published_at` on first publish.
    pub fn set_status(&mut self, status: PublishStatus, now: DateTime<Utc>) {
        if status == PublishStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Case-insensitive match against title, excerpt and tags.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.excerpt.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.contains(&needle))
    }

    /// Whether the post carries `tag` (tags are stored lowercased).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }
}

/// Editor payload for creating or replacing a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPostInput {
    /// Headline.
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    /// Explicit excerpt; derived from the content when absent.
    pub excerpt: Option<String>,
    /// Rich-text HTML from the editor.
    pub content: String,
    /// Byline.
    pub author: String,
    /// Listing category.
    pub category: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Hero image URL.
    pub cover_image: Option<String>,
    /// Requested publication state (defaults to draft).
    pub status: Option<PublishStatus>,
    /// Pin to the top of the index.
    pub featured: Option<bool>,
}
