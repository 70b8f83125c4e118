//! Dashboard counts.

use axum::extract::State;
use axum::Json;

use crate::error::Result;
use crate::server::AppState;
use crate::service::{dashboard_stats, DashboardStats};

pub(crate) async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(dashboard_stats(&state.storage)?))
}
