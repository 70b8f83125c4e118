//! Blog post editing for the admin console.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::Result;
use crate::model::{BlogPost, BlogPostInput, Page};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::AppState;
use crate::service::{BlogQuery, BulkOutcome, BulkRequest, ContentBulkAction};

pub(crate) async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlogQuery>,
) -> Result<Json<Page<BlogPost>>> {
    Ok(Json(state.blogs().list_all(&query)?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BlogPostInput>,
) -> Result<(StatusCode, Json<BlogPost>)> {
    Ok((StatusCode::CREATED, Json(state.blogs().create(input)?)))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>> {
    Ok(Json(state.blogs().get(&id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<BlogPostInput>,
) -> Result<Json<BlogPost>> {
    Ok(Json(state.blogs().update(&id, input)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.blogs().delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn bulk(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkRequest<ContentBulkAction>>,
) -> Result<Json<BulkOutcome>> {
    Ok(Json(state.blogs().bulk(request.action, &request.ids)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::server::test_support::app;

    #[tokio::test]
    async fn test_blog_crud_and_bulk() {
        let app = app();
        let token = app.login().await;

        let (status, post) = app
            .send(
                Method::POST,
                "/api/admin/blogs",
                Some(&token),
                Some(json!({
                    "title": "Launch Week",
                    "content": "<p>Hello</p><script>alert(1)</script>",
                    "author": "Ada",
                    "tags": ["News", "news", "Launch"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["slug"], "launch-week");
        assert_eq!(post["status"], "draft");
        assert!(!post["content"].as_str().unwrap().contains("<script"));
        let id = post["id"].as_str().unwrap().to_string();

        let (status, fetched) = app
            .send(Method::GET, &format!("/api/admin/blogs/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Launch Week");

        let (status, outcome) = app
            .send(
                Method::POST,
                "/api/admin/blogs/bulk",
                Some(&token),
                Some(json!({ "action": "publish", "ids": [id, "ghost"] })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome, json!({ "action": "publish", "requested": 2, "affected": 1 }));

        let (status, public) = app.send(Method::GET, "/api/blogs/launch-week", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["id"], id.as_str());

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/admin/blogs/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app
            .send(Method::DELETE, &format!("/api/admin/blogs/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_without_ids_is_rejected() {
        let app = app();
        let token = app.login().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/admin/blogs/bulk",
                Some(&token),
                Some(json!({ "action": "delete", "ids": [] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_tags_round_trip_as_json_arrays() {
        let app = app();
        let token = app.login().await;

        let (status, post) = app
            .send(
                Method::POST,
                "/api/admin/blogs",
                Some(&token),
                Some(json!({
                    "title": "Tagged",
                    "content": "<p>Body</p>",
                    "author": "Ada",
                    "tags": ["Rust", "2024"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["tags"], json!(["rust", "2024"]));
        let id = post["id"].as_str().unwrap().to_string();

        // What GET returns is accepted back as editor input.
        let (status, fetched) = app
            .send(Method::GET, &format!("/api/admin/blogs/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(fetched["tags"].is_array());

        let (status, updated) = app
            .send(
                Method::PUT,
                &format!("/api/admin/blogs/{id}"),
                Some(&token),
                Some(fetched),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["tags"], json!(["rust", "2024"]));
    }

    #[tokio::test]
    async fn test_tag_containing_separator_is_rejected() {
        let app = app();
        let token = app.login().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/admin/blogs",
                Some(&token),
                Some(json!({
                    "title": "Piped",
                    "content": "<p>Body</p>",
                    "author": "Ada",
                    "tags": ["a|b"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }
}
