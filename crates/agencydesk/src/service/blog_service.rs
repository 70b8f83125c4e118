//! Blog post use cases.
//!
//! # Invariants
//! - Slugs are unique among posts. Derived slugs get numeric suffixes; an
//!   explicit slug that is already taken is a conflict.
//! - A post keeps its slug when its title changes.
//! - `published_at` is stamped on first publish and kept afterwards.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::config::ContentConfig;
use crate::content::{self, HtmlSanitizer};
use crate::error::{Error, Result};
use crate::model::{self, BlogPost, BlogPostInput, Page, PublishStatus, Record};
use crate::storage::Storage;

use super::{
    clean_ids, optional_url, page_params, reject_separator, same_label, BulkOutcome,
    ContentBulkAction,
};

const MAX_TITLE_CHARS: usize = 200;
const MAX_AUTHOR_CHARS: usize = 120;
const MAX_CATEGORY_CHARS: usize = 80;
const MAX_EXCERPT_CHARS: usize = 500;
const DEFAULT_CATEGORY: &str = "general";

/// Listing filters for posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlogQuery {
    /// 1-based page number.
    pub page: Option<usize>,
    /// Page size.
    pub per_page: Option<usize>,
    /// Exact category (case-insensitive).
    pub category: Option<String>,
    /// Tag the post must carry.
    pub tag: Option<String>,
    /// Free-text search over title, excerpt and tags.
    pub q: Option<String>,
    /// Publication state (admin listings only).
    pub status: Option<PublishStatus>,
}

impl BlogQuery {
    fn matches(&self, post: &BlogPost) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| same_label(&post.category, c))
            && self.tag.as_deref().map_or(true, |t| post.has_tag(t))
            && self.q.as_deref().map_or(true, |q| post.matches_query(q))
            && self.status.map_or(true, |s| post.status == s)
    }
}

/// Blog post service facade.
#[derive(Debug)]
pub struct BlogService<'a> {
    storage: &'a Storage,
    sanitizer: &'a HtmlSanitizer,
    content: &'a ContentConfig,
}

impl<'a> BlogService<'a> {
    /// Create a service over the given storage.
    #[must_use]
    pub fn new(storage: &'a Storage, sanitizer: &'a HtmlSanitizer, content: &'a ContentConfig) -> Self {
        Self {
            storage,
            sanitizer,
            content,
        }
    }

    /// Published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the blog file cannot be read.
    pub fn list_published(&self, query: &BlogQuery) -> Result<Page<BlogPost>> {
        let query = BlogQuery {
            status: Some(PublishStatus::Published),
            ..query.clone()
        };
        let mut posts = self.storage.blogs.filter(|p| query.matches(p))?;
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        let (page, per_page) = page_params(self.content, query.page, query.per_page);
        Ok(Page::paginate(posts, page, per_page))
    }

    /// Every post matching the filters, most recently edited first.
    ///
    /// # Errors
    ///
    /// Returns an error if the blog file cannot be read.
    pub fn list_all(&self, query: &BlogQuery) -> Result<Page<BlogPost>> {
        let mut posts = self.storage.blogs.filter(|p| query.matches(p))?;
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let (page, per_page) = page_params(self.content, query.page, query.per_page);
        Ok(Page::paginate(posts, page, per_page))
    }

    /// A published post by slug. Drafts are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no published post has the slug.
    pub fn get_published(&self, slug: &str) -> Result<BlogPost> {
        self.storage
            .blogs
            .find(|p| p.slug == slug && p.is_published())?
            .ok_or_else(|| Error::not_found(BlogPost::COLLECTION, slug))
    }

    /// Any post by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn get(&self, id: &str) -> Result<BlogPost> {
        self.storage.blogs.require(id)
    }

    /// Create a post from editor input.
    ///
    /// # Errors
    ///
    /// Returns a validation, conflict or content error for bad input.
    pub fn create(&self, input: BlogPostInput) -> Result<BlogPost> {
        let draft = self.prepare(input)?;
        let now = Utc::now();

        let post = self.storage.blogs.mutate(|posts| {
            let slug = resolve_slug(posts, draft.explicit_slug.as_deref(), &draft.title, None)?;
            let mut post = BlogPost {
                id: model::new_id(),
                title: draft.title,
                slug,
                excerpt: draft.excerpt,
                content: draft.content,
                author: draft.author,
                category: draft.category,
                tags: draft.tags,
                cover_image: draft.cover_image,
                status: PublishStatus::Draft,
                featured: draft.featured.unwrap_or(false),
                reading_minutes: draft.reading_minutes,
                published_at: None,
                created_at: now,
                updated_at: now,
            };
            post.set_status(draft.status.unwrap_or_default(), now);
            posts.push(post.clone());
            Ok(post)
        })?;

        info!(id = %post.id, slug = %post.slug, status = %post.status, "Created blog post");
        Ok(post)
    }

    /// Replace a post's editable fields.
    ///
    /// Omitted `status` and `featured` keep their current values. An omitted
    /// slug keeps the current slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or a validation,
    /// conflict or content error for bad input.
    pub fn update(&self, id: &str, input: BlogPostInput) -> Result<BlogPost> {
        let draft = self.prepare(input)?;
        let now = Utc::now();

        let post = self.storage.blogs.mutate(|posts| {
            let index = posts
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| Error::not_found(BlogPost::COLLECTION, id))?;
            let slug = match draft.explicit_slug.as_deref() {
                Some(_) => resolve_slug(posts, draft.explicit_slug.as_deref(), &draft.title, Some(id))?,
                None => posts[index].slug.clone(),
            };

            let post = &mut posts[index];
            post.title = draft.title;
            post.slug = slug;
            post.excerpt = draft.excerpt;
            post.content = draft.content;
            post.author = draft.author;
            post.category = draft.category;
            post.tags = draft.tags;
            post.cover_image = draft.cover_image;
            post.reading_minutes = draft.reading_minutes;
            if let Some(featured) = draft.featured {
                post.featured = featured;
            }
            let status = draft.status.unwrap_or(post.status);
            post.set_status(status, now);
            Ok(post.clone())
        })?;

        info!(id = %post.id, slug = %post.slug, "Updated blog post");
        Ok(post)
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.blogs.delete(id)? {
            return Err(Error::not_found(BlogPost::COLLECTION, id));
        }
        info!(id, "Deleted blog post");
        Ok(())
    }

    /// Apply one action to many posts. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty id list.
    pub fn bulk(&self, action: ContentBulkAction, ids: &[String]) -> Result<BulkOutcome> {
        let ids = clean_ids(ids)?;
        let now = Utc::now();
        let blogs = &self.storage.blogs;

        let affected = match action {
            ContentBulkAction::Delete => blogs.delete_many(&ids)?,
            ContentBulkAction::Publish => {
                blogs.update_many(&ids, |p| p.set_status(PublishStatus::Published, now))?
            }
            ContentBulkAction::Unpublish => {
                blogs.update_many(&ids, |p| p.set_status(PublishStatus::Draft, now))?
            }
            ContentBulkAction::Feature | ContentBulkAction::Unfeature => {
                let featured = action == ContentBulkAction::Feature;
                blogs.update_many(&ids, |p| {
                    p.featured = featured;
                    p.updated_at = now;
                })?
            }
        };

        info!(action = ?action, requested = ids.len(), affected, "Bulk blog action");
        Ok(BulkOutcome::new(action, ids.len(), affected))
    }

    fn prepare(&self, input: BlogPostInput) -> Result<PreparedPost> {
        let title = model::required("title", &input.title, MAX_TITLE_CHARS)?;
        let author = model::required("author", &input.author, MAX_AUTHOR_CHARS)?;
        let category = model::optional("category", Some(input.category.as_str()), MAX_CATEGORY_CHARS)?
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let content = self.sanitizer.sanitize(&input.content)?.html;
        if content::strip_tags(&content).is_empty() {
            return Err(Error::validation("content", "must not be empty"));
        }

        let excerpt = match model::optional("excerpt", input.excerpt.as_deref(), MAX_EXCERPT_CHARS)? {
            Some(given) => content::strip_tags(&given),
            None => content::excerpt(&content, self.content.excerpt_length),
        };

        reject_separator("tags", &input.tags)?;
        let explicit_slug = model::optional("slug", input.slug.as_deref(), MAX_TITLE_CHARS)?
            .map(|s| content::slugify(&s));

        Ok(PreparedPost {
            reading_minutes: content::reading_minutes(&content, self.content.words_per_minute),
            title,
            explicit_slug,
            excerpt,
            content,
            author,
            category,
            tags: content::normalize_tags(&input.tags),
            cover_image: optional_url("cover_image", input.cover_image.as_deref())?,
            status: input.status,
            featured: input.featured,
        })
    }
}

/// Validated editor input, ready to be written.
struct PreparedPost {
    title: String,
    explicit_slug: Option<String>,
    excerpt: String,
    content: String,
    author: String,
    category: String,
    tags: Vec<String>,
    cover_image: Option<String>,
    status: Option<PublishStatus>,
    featured: Option<bool>,
    reading_minutes: u32,
}

/// Pick a slug for a post, ignoring the post being edited.
fn resolve_slug(
    posts: &[BlogPost],
    explicit: Option<&str>,
    title: &str,
    editing: Option<&str>,
) -> Result<String> {
    let taken = posts
        .iter()
        .filter(|p| Some(p.id.as_str()) != editing)
        .map(|p| p.slug.as_str());

    match explicit {
        Some(slug) => {
            if posts
                .iter()
                .any(|p| Some(p.id.as_str()) != editing && p.slug == slug)
            {
                return Err(Error::conflict(format!("slug '{slug}' is already in use")));
            }
            Ok(slug.to_string())
        }
        None => Ok(content::unique_slug(&content::slugify(title), taken)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SanitizeMode;
    use crate::service::test_support::fixture;

    fn input(title: &str) -> BlogPostInput {
        BlogPostInput {
            title: title.to_string(),
            content: "<p>Some <strong>useful</strong> words about shipping.</p>".to_string(),
            author: "Ada".to_string(),
            category: "Engineering".to_string(),
            tags: vec!["Rust".to_string(), "rust".to_string(), "Web".to_string()],
            ..BlogPostInput::default()
        }
    }

    #[test]
    fn test_create_derives_fields() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let post = svc.create(input("Shipping Fast!")).unwrap();
        assert_eq!(post.slug, "shipping-fast");
        assert_eq!(post.excerpt, "Some useful words about shipping.");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert_eq!(post.status, PublishStatus::Draft);
        assert_eq!(post.reading_minutes, 1);
        assert!(post.published_at.is_none());
        assert_eq!(svc.get(&post.id).unwrap(), post);
    }

    #[test]
    fn test_given_excerpt_is_plain_text() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let mut teaser = input("Teaser");
        teaser.excerpt = Some("&lt;script&gt;x()&lt;/script&gt;Read <em>this</em>".to_string());
        let post = svc.create(teaser).unwrap();
        assert_eq!(post.excerpt, "x() Read this");
    }

    #[test]
    fn test_tags_survive_reload() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let mut tagged = input("Numbers");
        tagged.tags = vec!["2024".to_string()];
        let post = svc.create(tagged).unwrap();
        assert_eq!(svc.get(&post.id).unwrap().tags, vec!["2024"]);

        let mut piped = input("Piped");
        piped.tags = vec!["a|b".to_string()];
        let err = svc.create(piped).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "tags", .. }));
        assert_eq!(svc.list_all(&BlogQuery::default()).unwrap().total, 1);
    }

    #[test]
    fn test_create_requires_fields() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let err = svc.create(input("  ")).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "title", .. }));

        let mut empty_body = input("Title");
        empty_body.content = "<p>  </p><script>x()</script>".to_string();
        let err = svc.create(empty_body).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "content", .. }));
    }

    #[test]
    fn test_derived_slug_collisions_get_suffix() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        assert_eq!(svc.create(input("Hello")).unwrap().slug, "hello");
        assert_eq!(svc.create(input("Hello")).unwrap().slug, "hello-2");
        assert_eq!(svc.create(input("hello!")).unwrap().slug, "hello-3");
    }

    #[test]
    fn test_explicit_slug_conflict() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        svc.create(input("Hello")).unwrap();

        let mut dup = input("Other");
        dup.slug = Some("Hello".to_string());
        assert!(matches!(svc.create(dup).unwrap_err(), Error::Conflict { .. }));
    }

    #[test]
    fn test_content_is_sanitized() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let mut dirty = input("Dirty");
        dirty.content = r#"<p onclick="x()">Hi</p><script>steal()</script>"#.to_string();
        let post = svc.create(dirty).unwrap();
        assert_eq!(post.content, "<p>Hi</p>");
    }

    #[test]
    fn test_reject_mode_refuses_unsafe_content() {
        let fx = fixture();
        let sanitizer = HtmlSanitizer::new(SanitizeMode::Reject);
        let svc = BlogService::new(&fx.storage, &sanitizer, &fx.config.content);

        let mut dirty = input("Dirty");
        dirty.content = "<p>Hi</p><iframe src=\"x\"></iframe>".to_string();
        let err = svc.create(dirty).unwrap_err();
        assert!(matches!(err, Error::ContentRejected { .. }));
        assert_eq!(fx.storage.blogs.count().unwrap(), 0);
    }

    #[test]
    fn test_update_keeps_slug_and_publish_time() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let mut first = input("Original");
        first.status = Some(PublishStatus::Published);
        let post = svc.create(first).unwrap();
        let published_at = post.published_at.unwrap();

        let mut edit = input("Renamed");
        edit.status = Some(PublishStatus::Draft);
        let edited = svc.update(&post.id, edit).unwrap();
        assert_eq!(edited.slug, "original");
        assert_eq!(edited.title, "Renamed");
        assert_eq!(edited.status, PublishStatus::Draft);

        let mut republish = input("Renamed");
        republish.status = Some(PublishStatus::Published);
        let again = svc.update(&post.id, republish).unwrap();
        assert_eq!(again.published_at, Some(published_at));
        assert_eq!(again.created_at, post.created_at);
    }

    #[test]
    fn test_update_explicit_slug_may_keep_own() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let post = svc.create(input("Mine")).unwrap();

        let mut edit = input("Mine");
        edit.slug = Some("mine".to_string());
        assert_eq!(svc.update(&post.id, edit).unwrap().slug, "mine");
    }

    #[test]
    fn test_update_and_delete_missing() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        assert!(svc.update("ghost", input("X")).unwrap_err().is_not_found());
        assert!(svc.delete("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn test_public_listing_filters_and_orders() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);

        let older = svc.create(input("Older")).unwrap();
        let newer = svc.create(input("Newer")).unwrap();
        let mut other = input("Design notes");
        other.category = "Design".to_string();
        other.tags = vec!["ux".to_string()];
        let design = svc.create(other).unwrap();
        svc.create(input("Still a draft")).unwrap();

        let ids: Vec<String> = vec![older.id.clone()];
        svc.bulk(ContentBulkAction::Publish, &ids).unwrap();
        let ids: Vec<String> = vec![newer.id.clone(), design.id.clone()];
        svc.bulk(ContentBulkAction::Publish, &ids).unwrap();

        let page = svc.list_published(&BlogQuery::default()).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(BlogPost::is_published));
        assert_eq!(page.items.last().unwrap().id, older.id);

        let engineering = svc
            .list_published(&BlogQuery {
                category: Some("engineering".to_string()),
                ..BlogQuery::default()
            })
            .unwrap();
        assert_eq!(engineering.total, 2);

        let tagged = svc
            .list_published(&BlogQuery {
                tag: Some("UX".to_string()),
                ..BlogQuery::default()
            })
            .unwrap();
        assert_eq!(tagged.items, vec![svc.get(&design.id).unwrap()]);

        let searched = svc
            .list_published(&BlogQuery {
                q: Some("newer".to_string()),
                ..BlogQuery::default()
            })
            .unwrap();
        assert_eq!(searched.total, 1);

        let paged = svc
            .list_published(&BlogQuery {
                page: Some(2),
                per_page: Some(2),
                ..BlogQuery::default()
            })
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.total_pages, 2);
    }

    #[test]
    fn test_get_published_hides_drafts() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let post = svc.create(input("Hidden")).unwrap();

        assert!(svc.get_published(&post.slug).unwrap_err().is_not_found());
        svc.bulk(ContentBulkAction::Publish, &[post.id.clone()]).unwrap();
        assert_eq!(svc.get_published(&post.slug).unwrap().id, post.id);
    }

    #[test]
    fn test_bulk_actions() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let a = svc.create(input("A")).unwrap();
        let b = svc.create(input("B")).unwrap();
        let ids = vec![a.id.clone(), b.id.clone(), "missing".to_string(), a.id.clone()];

        let outcome = svc.bulk(ContentBulkAction::Feature, &ids).unwrap();
        assert_eq!(outcome.action, "feature");
        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.affected, 2);
        assert!(svc.get(&a.id).unwrap().featured);

        let outcome = svc.bulk(ContentBulkAction::Delete, &ids).unwrap();
        assert_eq!(outcome.affected, 2);
        assert_eq!(fx.storage.blogs.count().unwrap(), 0);

        assert!(svc.bulk(ContentBulkAction::Delete, &[]).is_err());
    }

    #[test]
    fn test_admin_listing_status_filter() {
        let fx = fixture();
        let svc = BlogService::new(&fx.storage, &fx.sanitizer, &fx.config.content);
        let mut live = input("Live");
        live.status = Some(PublishStatus::Published);
        svc.create(live).unwrap();
        svc.create(input("Draft")).unwrap();

        let drafts = svc
            .list_all(&BlogQuery {
                status: Some(PublishStatus::Draft),
                ..BlogQuery::default()
            })
            .unwrap();
        assert_eq!(drafts.total, 1);
        assert_eq!(drafts.items[0].title, "Draft");
        assert_eq!(svc.list_all(&BlogQuery::default()).unwrap().total, 2);
    }
}
