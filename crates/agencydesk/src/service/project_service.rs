//! Portfolio project use cases.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::info;

use crate::config::ContentConfig;
use crate::content::{self, HtmlSanitizer};
use crate::error::{Error, Result};
use crate::model::{self, Project, ProjectInput, PublishStatus, Record};
use crate::storage::Storage;

use super::{clean_ids, clean_list, optional_url, same_label, BulkOutcome, ContentBulkAction};

const MAX_TITLE_CHARS: usize = 200;
const MAX_CLIENT_CHARS: usize = 120;
const MAX_CATEGORY_CHARS: usize = 80;
const MAX_SUMMARY_CHARS: usize = 300;
const DEFAULT_CATEGORY: &str = "general";
const EARLIEST_YEAR: u16 = 1990;

/// Gallery filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectQuery {
    /// Exact category (case-insensitive).
    pub category: Option<String>,
    /// Only featured (or only non-featured) projects.
    pub featured: Option<bool>,
    /// Publication state (admin listings only).
    pub status: Option<PublishStatus>,
}

impl ProjectQuery {
    fn matches(&self, project: &Project) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| same_label(&project.category, c))
            && self.featured.map_or(true, |f| project.featured == f)
            && self.status.map_or(true, |s| project.status == s)
    }
}

/// Portfolio project service facade.
#[derive(Debug)]
pub struct ProjectService<'a> {
    storage: &'a Storage,
    sanitizer: &'a HtmlSanitizer,
    content: &'a ContentConfig,
}

impl<'a> ProjectService<'a> {
    /// Create a service over the given storage.
    #[must_use]
    pub fn new(storage: &'a Storage, sanitizer: &'a HtmlSanitizer, content: &'a ContentConfig) -> Self {
        Self {
            storage,
            sanitizer,
            content,
        }
    }

    /// Published projects in gallery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project file cannot be read.
    pub fn list_published(&self, query: &ProjectQuery) -> Result<Vec<Project>> {
        let query = ProjectQuery {
            status: Some(PublishStatus::Published),
            ..query.clone()
        };
        self.list_all(&query)
    }

    /// Every project matching the filters, in gallery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project file cannot be read.
    pub fn list_all(&self, query: &ProjectQuery) -> Result<Vec<Project>> {
        let mut projects = self.storage.projects.filter(|p| query.matches(p))?;
        projects.sort_by(Project::gallery_order);
        Ok(projects)
    }

    /// A published project by slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no published project has the slug.
    pub fn get_published(&self, slug: &str) -> Result<Project> {
        self.storage
            .projects
            .find(|p| p.slug == slug && p.is_published())?
            .ok_or_else(|| Error::not_found(Project::COLLECTION, slug))
    }

    /// Any project by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn get(&self, id: &str) -> Result<Project> {
        self.storage.projects.require(id)
    }

    /// Create a project from editor input.
    ///
    /// # Errors
    ///
    /// Returns a validation, conflict or content error for bad input.
    pub fn create(&self, input: ProjectInput) -> Result<Project> {
        let draft = self.prepare(input)?;
        let now = Utc::now();

        let project = self.storage.projects.mutate(|projects| {
            let slug = resolve_slug(projects, draft.explicit_slug.as_deref(), &draft.title, None)?;
            let project = Project {
                id: model::new_id(),
                title: draft.title,
                slug,
                client: draft.client,
                summary: draft.summary,
                description: draft.description,
                category: draft.category,
                services: draft.services,
                cover_image: draft.cover_image,
                gallery: draft.gallery,
                project_url: draft.project_url,
                year: draft.year,
                featured: draft.featured.unwrap_or(false),
                status: draft.status.unwrap_or_default(),
                sort_order: draft.sort_order.unwrap_or(0),
                created_at: now,
                updated_at: now,
            };
            projects.push(project.clone());
            Ok(project)
        })?;

        info!(id = %project.id, slug = %project.slug, "Created project");
        Ok(project)
    }

    /// Replace a project's editable fields.
    ///
    /// Omitted `status`, `featured`, `sort_order` and `slug` keep their current
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or a validation,
    /// conflict or content error for bad input.
    pub fn update(&self, id: &str, input: ProjectInput) -> Result<Project> {
        let draft = self.prepare(input)?;
        let now = Utc::now();

        let project = self.storage.projects.mutate(|projects| {
            let index = projects
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| Error::not_found(Project::COLLECTION, id))?;
            let slug = if draft.explicit_slug.is_some() {
                resolve_slug(projects, draft.explicit_slug.as_deref(), &draft.title, Some(id))?
            } else {
                projects[index].slug.clone()
            };

            let project = &mut projects[index];
            project.title = draft.title;
            project.slug = slug;
            project.client = draft.client;
            project.summary = draft.summary;
            project.description = draft.description;
            project.category = draft.category;
            project.services = draft.services;
            project.cover_image = draft.cover_image;
            project.gallery = draft.gallery;
            project.project_url = draft.project_url;
            project.year = draft.year;
            if let Some(featured) = draft.featured {
                project.featured = featured;
            }
            if let Some(status) = draft.status {
                project.status = status;
            }
            if let Some(sort_order) = draft.sort_order {
                project.sort_order = sort_order;
            }
            project.updated_at = now;
            Ok(project.clone())
        })?;

        info!(id = %project.id, slug = %project.slug, "Updated project");
        Ok(project)
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.projects.delete(id)? {
            return Err(Error::not_found(Project::COLLECTION, id));
        }
        info!(id, "Deleted project");
        Ok(())
    }

    /// Apply one action to many projects. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty id list.
    pub fn bulk(&self, action: ContentBulkAction, ids: &[String]) -> Result<BulkOutcome> {
        let ids = clean_ids(ids)?;
        let now = Utc::now();
        let projects = &self.storage.projects;

        let affected = match action {
            ContentBulkAction::Delete => projects.delete_many(&ids)?,
            ContentBulkAction::Publish | ContentBulkAction::Unpublish => {
                let status = if action == ContentBulkAction::Publish {
                    PublishStatus::Published
                } else {
                    PublishStatus::Draft
                };
                projects.update_many(&ids, |p| {
                    p.status = status;
                    p.updated_at = now;
                })?
            }
            ContentBulkAction::Feature | ContentBulkAction::Unfeature => {
                let featured = action == ContentBulkAction::Feature;
                projects.update_many(&ids, |p| {
                    p.featured = featured;
                    p.updated_at = now;
                })?
            }
        };

        info!(action = ?action, requested = ids.len(), affected, "Bulk project action");
        Ok(BulkOutcome::new(action, ids.len(), affected))
    }

    fn prepare(&self, input: ProjectInput) -> Result<PreparedProject> {
        let title = model::required("title", &input.title, MAX_TITLE_CHARS)?;
        let client = model::required("client", &input.client, MAX_CLIENT_CHARS)?;
        let category = model::optional("category", Some(input.category.as_str()), MAX_CATEGORY_CHARS)?
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let description = self.sanitizer.sanitize(&input.description)?.html;
        if content::strip_tags(&description).is_empty() {
            return Err(Error::validation("description", "must not be empty"));
        }

        let summary = match model::optional("summary", input.summary.as_deref(), MAX_SUMMARY_CHARS)? {
            Some(given) => content::strip_tags(&given),
            None => content::excerpt(&description, self.content.excerpt_length.min(MAX_SUMMARY_CHARS)),
        };

        if let Some(year) = input.year {
            let latest = u16::try_from(Utc::now().year() + 1).unwrap_or(u16::MAX);
            if !(EARLIEST_YEAR..=latest).contains(&year) {
                return Err(Error::validation(
                    "year",
                    format!("must be between {EARLIEST_YEAR} and {latest}"),
                ));
            }
        }

        let gallery = clean_list("gallery", &input.gallery)?
            .into_iter()
            .map(|url| optional_url("gallery", Some(url.as_str())).map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>>>()?;

        Ok(PreparedProject {
            explicit_slug: model::optional("slug", input.slug.as_deref(), MAX_TITLE_CHARS)?
                .map(|s| content::slugify(&s)),
            title,
            client,
            summary,
            description,
            category,
            services: clean_list("services", &input.services)?,
            cover_image: optional_url("cover_image", input.cover_image.as_deref())?,
            gallery,
            project_url: optional_url("project_url", input.project_url.as_deref())?,
            year: input.year,
            featured: input.featured,
            status: input.status,
            sort_order: input.sort_order,
        })
    }
}

/// Validated editor input, ready to be written.
struct PreparedProject {
    title: String,
    explicit_slug: Option<String>,
    client: String,
    summary: String,
    description: String,
    category: String,
    services: Vec<String>,
    cover_image: Option<String>,
    gallery: Vec<String>,
    project_url: Option<String>,
    year: Option<u16>,
    featured: Option<bool>,
    status: Option<PublishStatus>,
    sort_order: Option<i32>,
}

fn resolve_slug(
    projects: &[Project],
    explicit: Option<&str>,
    title: &str,
    editing: Option<&str>,
) -> Result<String> {
    let others = move || projects.iter().filter(move |p| Some(p.id.as_str()) != editing);
    match explicit {
        Some(slug) if others().any(|p| p.slug == slug) => {
            Err(Error::conflict(format!("slug '{slug}' is already in use")))
        }
        Some(slug) => Ok(slug.to_string()),
        None => Ok(content::unique_slug(
            &content::slugify(title),
            others().map(|p| p.slug.as_str()),
        )),
    }
}
