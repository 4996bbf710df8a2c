use crate::domain::access::Operation;
use crate::domain::model::{ActivityKind, RoleChange, User};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{body, gate, load, log_activity};
use crate::transport::http::types::{ApiError, AppState, UserQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "No session", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn current_user_handler(user: CurrentUser) -> Json<User> {
    Json(user.into_user())
}

#[utoipa::path(
    patch,
    path = "/api/auth/user/role",
    request_body = RoleChange,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Unknown role, or a role only an admin can grant", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn choose_role_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<RoleChange>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let change = body(request)?;
    if !change.role.is_self_assignable() {
        return Err(ApiError::BadRequest(format!(
            "role '{}' must be granted by an admin",
            change.role
        )));
    }
    user.register(&state).await?;
    let mut me = user.user().clone();
    if me.role == change.role {
        return Ok(Json(me));
    }
    me.role = change.role;
    me.updated_at = Utc::now();
    state.repo.update(&me).await?;
    log_activity(
        &state,
        ActivityKind::UserRoleChanged,
        &user,
        format!("Selected role {}", me.role),
        Some(&me.id),
    )
    .await?;
    Ok(Json(me))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "All users, newest first", body = [User]),
        (status = 403, description = "Admin only", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn list_users_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    gate(&state, &user, Operation::ManageUsers).await?;
    let filter = Filter::new().eq_opt("role", query.role.map(|r| r.as_str()));
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = RoleChange,
    responses(
        (status = 200, description = "Role assigned", body = User),
        (status = 403, description = "Admin only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown user", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn assign_role_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<RoleChange>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    gate(&state, &user, Operation::ManageUsers).await?;
    let change = body(request)?;
    let mut target: User = load(&state, &id, "user").await?;
    target.role = change.role;
    target.updated_at = Utc::now();
    state.repo.update(&target).await?;
    log_activity(
        &state,
        ActivityKind::UserRoleChanged,
        &user,
        format!("Assigned role {} to {}", target.role, target.display_name()),
        Some(&target.id),
    )
    .await?;
    Ok(Json(target))
}
