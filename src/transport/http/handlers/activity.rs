use crate::domain::model::ActivityEntry;
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::types::{ApiError, AppState, LimitQuery};
use axum::extract::{Query, State};
use axum::Json;

/// Most recent activity across all users.
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(LimitQuery),
    responses((status = 200, description = "Activity log, newest first", body = [ActivityEntry]))
)]
pub async fn list_activity_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let entries = state
        .repo
        .recent(&Filter::new(), Some(query.effective()))
        .await?;
    Ok(Json(entries))
}
