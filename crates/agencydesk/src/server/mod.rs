//! HTTP interface.
//!
//! The router is split into three groups: public routes for the marketing
//! site, `/api/auth` for session handling, and `/api/admin` behind bearer
//! authentication. Every handler runs synchronous file I/O through the
//! service layer; the target is a single low-traffic site.

mod error;
mod extract;
mod handlers;
mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::content::HtmlSanitizer;
use crate::error::{Error, Result};
use crate::service::{BlogService, EnquiryService, ProjectService, UserService};
use crate::storage::Storage;

pub use middleware::AuthenticatedAdmin;

/// Everything a request handler can reach.
#[derive(Debug)]
pub struct AppContext {
    /// File-backed collections.
    pub storage: Storage,
    /// Live admin sessions.
    pub sessions: SessionStore,
    /// Loaded configuration.
    pub config: Config,
    /// Rich text sanitizer built from `content.sanitize_mode`.
    pub sanitizer: HtmlSanitizer,
}

/// Shared handler state.
pub type AppState = Arc<AppContext>;

impl AppContext {
    /// Wire up state from configuration and an opened store.
    #[must_use]
    pub fn new(config: Config, storage: Storage) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl()),
            sanitizer: HtmlSanitizer::new(config.content.sanitize_mode),
            storage,
            config,
        }
    }

    /// Blog use cases over this state.
    #[must_use]
    pub fn blogs(&self) -> BlogService<'_> {
        BlogService::new(&self.storage, &self.sanitizer, &self.config.content)
    }

    /// Project use cases over this state.
    #[must_use]
    pub fn projects(&self) -> ProjectService<'_> {
        ProjectService::new(&self.storage, &self.sanitizer, &self.config.content)
    }

    /// Enquiry use cases over this state.
    #[must_use]
    pub fn enquiries(&self) -> EnquiryService<'_> {
        EnquiryService::new(&self.storage)
    }

    /// Account and session use cases over this state.
    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.storage, &self.sessions, &self.config.auth)
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    use handlers::{admin, auth, public};

    let owner_only = Router::new()
        .route("/users", get(admin::users::list).post(admin::users::create))
        .route(
            "/users/{id}",
            put(admin::users::update).delete(admin::users::delete),
        )
        .route_layer(from_fn(middleware::require_owner));

    let admin = Router::new()
        .route("/blogs", get(admin::blogs::list).post(admin::blogs::create))
        .route(
            "/blogs/{id}",
            get(admin::blogs::get)
                .put(admin::blogs::update)
                .delete(admin::blogs::delete),
        )
        .route("/blogs/bulk", post(admin::blogs::bulk))
        .route(
            "/projects",
            get(admin::projects::list).post(admin::projects::create),
        )
        .route(
            "/projects/{id}",
            get(admin::projects::get)
                .put(admin::projects::update)
                .delete(admin::projects::delete),
        )
        .route("/projects/bulk", post(admin::projects::bulk))
        .route("/enquiries", get(admin::enquiries::list))
        .route(
            "/enquiries/{id}",
            get(admin::enquiries::get)
                .put(admin::enquiries::update)
                .delete(admin::enquiries::delete),
        )
        .route("/enquiries/bulk", post(admin::enquiries::bulk))
        .route("/comments", get(admin::comments::list))
        .route(
            "/comments/{id}",
            put(admin::comments::update).delete(admin::comments::delete),
        )
        .route("/comments/bulk", post(admin::comments::bulk))
        .route("/stats", get(admin::stats::dashboard))
        .route("/export/{collection}", get(admin::export::download))
        .merge(owner_only)
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    let session = Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        .route("/login", post(auth::login));

    Router::new()
        .route("/health", get(public::health))
        .route("/api/blogs", get(public::list_blogs))
        .route("/api/blogs/{slug}", get(public::get_blog))
        .route(
            "/api/blogs/{slug}/comments",
            get(public::list_comments).post(public::submit_comment),
        )
        .route("/api/projects", get(public::list_projects))
        .route("/api/projects/{slug}", get(public::get_project))
        .route("/api/enquiries", post(public::submit_enquiry))
        .nest("/api/auth", session)
        .nest("/api/admin", admin)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(from_fn(middleware::trace_request))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address is invalid or cannot be bound.
pub async fn serve(state: AppState) -> Result<()> {
    let bind = state.config.server.bind_address.clone();
    let addr: SocketAddr = bind.parse().map_err(|e| {
        Error::ConfigValidation {
            message: format!("server.bind_address '{bind}' is not a socket address: {e}"),
        }
    })?;

    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(
        address = %local,
        data_dir = %state.storage.root().display(),
        "agencydesk listening"
    );

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
