//! Reader comments on blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// Moderation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    /// Awaiting moderation.
    #[default]
    Pending,
    /// Shown on the post.
    Approved,
    /// Hidden.
    Rejected,
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A comment as stored in `comments.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogComment {
    /// Unique identifier.
    pub id: String,
    /// Post the comment belongs to.
    pub post_id: String,
    /// Comment being replied to.
    pub parent_id: Option<String>,
    /// Commenter's name.
    pub author_name: String,
    /// Commenter's email; never shown publicly.
    pub author_email: String,
    /// Plain-text body.
    pub body: String,
    /// Moderation state.
    pub status: CommentStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Record for BlogComment {
    const COLLECTION: &'static str = "comments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "post_id",
        "parent_id",
        "author_name",
        "author_email",
        "body",
        "status",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Public view of an approved comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicComment {
    /// Unique identifier.
    pub id: String,
    /// Comment being replied to.
    pub parent_id: Option<String>,
    /// Commenter's name.
    pub author_name: String,
    /// Plain-text body.
    pub body: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl From<BlogComment> for PublicComment {
    fn from(comment: BlogComment) -> Self {
        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            author_name: comment.author_name,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

/// Reader submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewComment {
    /// Commenter's name.
    pub author_name: String,
    /// Commenter's email.
    pub author_email: String,
    /// Comment text.
    pub body: String,
    /// Comment being replied to.
    pub parent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_comment() -> BlogComment {
        BlogComment {
            id: "c-1".to_string(),
            post_id: "post-1".to_string(),
            parent_id: None,
            author_name: "Linus".to_string(),
            author_email: "linus@example.com".to_string(),
            body: "Great read.".to_string(),
            status: CommentStatus::Approved,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_matches_columns() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(sample_comment()).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().next().unwrap(), BlogComment::COLUMNS.join(","));
    }

    #[test]
    fn test_public_comment_hides_email() {
        let public = PublicComment::from(sample_comment());
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("linus@example.com"));
        assert!(json.contains("Great read."));
    }

    #[test]
    fn test_status_default() {
        assert_eq!(CommentStatus::default(), CommentStatus::Pending);
        assert_eq!(CommentStatus::Rejected.to_string(), "rejected");
    }
}
