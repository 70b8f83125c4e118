//! Counts for the admin dashboard.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::{CommentStatus, EnquiryStatus, PublishStatus};
use crate::storage::Storage;

/// Published versus draft counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishCounts {
    /// All records.
    pub total: usize,
    /// Publicly visible.
    pub published: usize,
    /// Not yet visible.
    pub drafts: usize,
    /// Highlighted.
    pub featured: usize,
}

/// Lead pipeline counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnquiryCounts {
    /// All leads.
    pub total: usize,
    /// Leads received in the last seven days.
    pub last_7_days: usize,
    /// Leads per pipeline stage (every stage present, possibly zero).
    pub by_status: BTreeMap<String, usize>,
}

/// Moderation queue counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentCounts {
    /// All comments.
    pub total: usize,
    /// Awaiting moderation.
    pub pending: usize,
}

/// Account counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    /// All accounts.
    pub total: usize,
    /// Accounts that can log in.
    pub active: usize,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Blog posts.
    pub blogs: PublishCounts,
    /// Portfolio projects.
    pub projects: PublishCounts,
    /// Leads.
    pub enquiries: EnquiryCounts,
    /// Comments.
    pub comments: CommentCounts,
    /// Admin accounts.
    pub users: UserCounts,
}

fn publish_counts(items: impl Iterator<Item = (PublishStatus, bool)>) -> PublishCounts {
    items.fold(PublishCounts::default(), |mut acc, (status, featured)| {
        acc.total += 1;
        match status {
            PublishStatus::Published => acc.published += 1,
            PublishStatus::Draft => acc.drafts += 1,
        }
        if featured {
            acc.featured += 1;
        }
        acc
    })
}

/// Gather dashboard counts from every collection.
///
/// # Errors
///
/// Returns an error if any collection file cannot be read.
pub fn dashboard_stats(storage: &Storage) -> Result<DashboardStats> {
    let blogs = storage.blogs.all()?;
    let projects = storage.projects.all()?;
    let enquiries = storage.enquiries.all()?;
    let comments = storage.comments.all()?;
    let users = storage.users.all()?;

    let week_ago = Utc::now() - Duration::days(7);
    let mut by_status: BTreeMap<String, usize> = EnquiryStatus::ALL
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    for enquiry in &enquiries {
        *by_status.entry(enquiry.status.to_string()).or_default() += 1;
    }

    Ok(DashboardStats {
        blogs: publish_counts(blogs.iter().map(|p| (p.status, p.featured))),
        projects: publish_counts(projects.iter().map(|p| (p.status, p.featured))),
        enquiries: EnquiryCounts {
            total: enquiries.len(),
            last_7_days: enquiries.iter().filter(|e| e.created_at >= week_ago).count(),
            by_status,
        },
        comments: CommentCounts {
            total: comments.len(),
            pending: comments
                .iter()
                .filter(|c| c.status == CommentStatus::Pending)
                .count(),
        },
        users: UserCounts {
            total: users.len(),
            active: users.iter().filter(|u| u.active).count(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlogPostInput, NewEnquiry};
    use crate::service::test_support::fixture;
    use crate::service::{BlogService, EnquiryService};

    #[test]
    fn test_empty_dashboard() {
        let fx = fixture();
        let stats = dashboard_stats(&fx.storage).unwrap();
        assert_eq!(stats.blogs, PublishCounts::default());
        assert_eq!(stats.enquiries.by_status.len(), EnquiryStatus::ALL.len());
        assert!(stats.enquiries.by_status.values().all(|n| *n == 0));
    }

    #[test]
    fn test_counts() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        blogs
            .create(BlogPostInput {
                title: "Live".to_string(),
                content: "<p>x</p>".to_string(),
                author: "Ada".to_string(),
                status: Some(PublishStatus::Published),
                featured: Some(true),
                ..BlogPostInput::default()
            })
            .unwrap();
        blogs
            .create(BlogPostInput {
                title: "Draft".to_string(),
                content: "<p>x</p>".to_string(),
                author: "Ada".to_string(),
                ..BlogPostInput::default()
            })
            .unwrap();
        EnquiryService::new(&fx.storage)
            .submit(NewEnquiry {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                message: "Hello".to_string(),
                ..NewEnquiry::default()
            })
            .unwrap();

        let stats = dashboard_stats(&fx.storage).unwrap();
        assert_eq!(
            stats.blogs,
            PublishCounts {
                total: 2,
                published: 1,
                drafts: 1,
                featured: 1,
            }
        );
        assert_eq!(stats.enquiries.total, 1);
        assert_eq!(stats.enquiries.last_7_days, 1);
        assert_eq!(stats.enquiries.by_status["new"], 1);
        assert_eq!(stats.users.total, 0);
    }
}
