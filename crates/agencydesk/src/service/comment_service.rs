//! Reader comments and their moderation.
//!
//! # Invariants
//! - New comments start `pending`; only `approved` ones are public.
//! - A comment must point at a published post when it is submitted. Nothing
//!   re-checks that afterwards.
//! - A reply's parent must belong to the same post.

use chrono::Utc;
use tracing::info;

use crate::content;
use crate::error::{Error, Result};
use crate::model::{self, BlogComment, CommentStatus, NewComment, PublicComment, Record};
use crate::storage::Storage;

use super::{clean_ids, BlogService, BulkOutcome, CommentBulkAction};

const MAX_AUTHOR_CHARS: usize = 80;
const MAX_BODY_CHARS: usize = 2000;

/// Comment service facade.
#[derive(Debug)]
pub struct CommentService<'a> {
    storage: &'a Storage,
    blogs: &'a BlogService<'a>,
}

impl<'a> CommentService<'a> {
    /// Create a service; `blogs` resolves post slugs.
    #[must_use]
    pub fn new(storage: &'a Storage, blogs: &'a BlogService<'a>) -> Self {
        Self { storage, blogs }
    }

    /// Approved comments on a published post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no published post has the slug.
    pub fn list_public(&self, slug: &str) -> Result<Vec<PublicComment>> {
        let post = self.blogs.get_published(slug)?;
        let mut comments = self
            .storage
            .comments
            .filter(|c| c.post_id == post.id && c.status == CommentStatus::Approved)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments.into_iter().map(PublicComment::from).collect())
    }

    /// Submit a comment on a published post. It starts out pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown or unpublished post, or a
    /// validation error for bad input.
    pub fn submit(&self, slug: &str, input: NewComment) -> Result<BlogComment> {
        let post = self.blogs.get_published(slug)?;

        let author_name = model::required(
            "author_name",
            &content::strip_tags(&input.author_name),
            MAX_AUTHOR_CHARS,
        )?;
        let author_email = model::normalize_email("author_email", &input.author_email)?;
        let body = model::required("body", &content::strip_tags(&input.body), MAX_BODY_CHARS)?;
        let parent_id = model::optional("parent_id", input.parent_id.as_deref(), 64)?;

        let comment = self.storage.comments.mutate(|comments| {
            if let Some(parent) = parent_id.as_deref() {
                if !comments.iter().any(|c| c.id == parent && c.post_id == post.id) {
                    return Err(Error::validation(
                        "parent_id",
                        "must reference a comment on the same post",
                    ));
                }
            }
            let comment = BlogComment {
                id: model::new_id(),
                post_id: post.id.clone(),
                parent_id,
                author_name,
                author_email,
                body,
                status: CommentStatus::Pending,
                created_at: Utc::now(),
            };
            comments.push(comment.clone());
            Ok(comment)
        })?;

        info!(id = %comment.id, post_id = %comment.post_id, "Received comment");
        Ok(comment)
    }

    /// Comments for moderation, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the comments file cannot be read.
    pub fn list(&self, status: Option<CommentStatus>) -> Result<Vec<BlogComment>> {
        let mut comments = self
            .storage
            .comments
            .filter(|c| status.map_or(true, |s| c.status == s))?;
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    /// Move one comment to a moderation state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn set_status(&self, id: &str, status: CommentStatus) -> Result<BlogComment> {
        let comment = self.storage.comments.update(id, |c| {
            c.status = status;
            Ok(())
        })?;
        info!(id, status = %status, "Moderated comment");
        Ok(comment)
    }

    /// Delete one comment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.comments.delete(id)? {
            return Err(Error::not_found(BlogComment::COLLECTION, id));
        }
        info!(id, "Deleted comment");
        Ok(())
    }

    /// Apply one moderation action to many comments.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty id list.
    pub fn bulk(&self, action: CommentBulkAction, ids: &[String]) -> Result<BulkOutcome> {
        let ids = clean_ids(ids)?;
        let comments = &self.storage.comments;
        let affected = match action {
            CommentBulkAction::Delete => comments.delete_many(&ids)?,
            CommentBulkAction::Approve => {
                comments.update_many(&ids, |c| c.status = CommentStatus::Approved)?
            }
            CommentBulkAction::Reject => {
                comments.update_many(&ids, |c| c.status = CommentStatus::Rejected)?
            }
        };
        info!(action = ?action, requested = ids.len(), affected, "Bulk comment action");
        Ok(BulkOutcome::new(action, ids.len(), affected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlogPostInput, PublishStatus};
    use crate::service::test_support::fixture;

    fn new_comment(body: &str) -> NewComment {
        NewComment {
            author_name: "Reader".to_string(),
            author_email: "reader@example.com".to_string(),
            body: body.to_string(),
            parent_id: None,
        }
    }

    fn post_input(title: &str, status: PublishStatus) -> BlogPostInput {
        BlogPostInput {
            title: title.to_string(),
            content: "<p>Body</p>".to_string(),
            author: "Ada".to_string(),
            status: Some(status),
            ..BlogPostInput::default()
        }
    }

    #[test]
    fn test_submit_and_moderate() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let post = blogs.create(post_input("Live", PublishStatus::Published)).unwrap();

        let comment = svc
            .submit(&post.slug, new_comment("<b>Great</b> post!"))
            .unwrap();
        assert_eq!(comment.body, "Great post!");
        assert_eq!(comment.status, CommentStatus::Pending);
        assert_eq!(comment.post_id, post.id);
        assert!(svc.list_public(&post.slug).unwrap().is_empty());

        svc.set_status(&comment.id, CommentStatus::Approved).unwrap();
        let public = svc.list_public(&post.slug).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].body, "Great post!");
    }

    #[test]
    fn test_encoded_markup_is_stored_as_text() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let post = blogs.create(post_input("Live", PublishStatus::Published)).unwrap();

        let mut input = new_comment("&lt;script&gt;alert(1)&lt;/script&gt;");
        input.author_name = "&lt;img src=x onerror=alert(1)&gt;Eve".to_string();
        let comment = svc.submit(&post.slug, input).unwrap();
        assert_eq!(comment.body, "alert(1)");
        assert_eq!(comment.author_name, "Eve");

        let stored = svc.list(None).unwrap();
        assert!(!stored[0].body.contains('<'));
        assert!(!stored[0].author_name.contains('<'));
    }

    #[test]
    fn test_submit_to_draft_or_missing_post() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let draft = blogs.create(post_input("Draft", PublishStatus::Draft)).unwrap();

        assert!(svc
            .submit(&draft.slug, new_comment("hi"))
            .unwrap_err()
            .is_not_found());
        assert!(svc
            .submit("no-such-post", new_comment("hi"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_submit_validation() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let post = blogs.create(post_input("Live", PublishStatus::Published)).unwrap();

        let err = svc.submit(&post.slug, new_comment("<p> </p>")).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "body", .. }));

        let err = svc
            .submit(&post.slug, new_comment(&"x".repeat(MAX_BODY_CHARS + 1)))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "body", .. }));

        let mut orphan = new_comment("reply");
        orphan.parent_id = Some("missing".to_string());
        let err = svc.submit(&post.slug, orphan).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "parent_id", .. }));
    }

    #[test]
    fn test_reply_to_existing_comment() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let post = blogs.create(post_input("Live", PublishStatus::Published)).unwrap();
        let parent = svc.submit(&post.slug, new_comment("first")).unwrap();

        let mut reply = new_comment("second");
        reply.parent_id = Some(parent.id.clone());
        let reply = svc.submit(&post.slug, reply).unwrap();
        assert_eq!(reply.parent_id, Some(parent.id));
    }

    #[test]
    fn test_admin_list_and_bulk() {
        let fx = fixture();
        let blogs = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let svc = CommentService::new(&fx.storage, &blogs);
        let post = blogs.create(post_input("Live", PublishStatus::Published)).unwrap();
        let a = svc.submit(&post.slug, new_comment("a")).unwrap();
        let b = svc.submit(&post.slug, new_comment("b")).unwrap();

        let ids = vec![a.id.clone()];
        let outcome = svc.bulk(CommentBulkAction::Reject, &ids).unwrap();
        assert_eq!(outcome.affected, 1);
        assert_eq!(svc.list(Some(CommentStatus::Rejected)).unwrap().len(), 1);
        assert_eq!(svc.list(Some(CommentStatus::Pending)).unwrap()[0].id, b.id);
        assert_eq!(svc.list(None).unwrap().len(), 2);

        svc.bulk(CommentBulkAction::Delete, &[a.id.clone(), b.id.clone()])
            .unwrap();
        assert!(svc.delete(&a.id).unwrap_err().is_not_found());
    }
}
