use crate::domain::access::{authorize, Operation};
use crate::domain::model::{ActivityEntry, ActivityKind, Anchored, Entity, Validate};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::types::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Role gate. Called before the body is looked at; a first-seen caller is
/// stored only once the gate passes.
pub async fn gate(
    state: &AppState,
    user: &CurrentUser,
    operation: Operation,
) -> Result<(), ApiError> {
    authorize(user.role(), operation)?;
    user.register(state).await
}

/// Unwraps a JSON body and runs its semantic checks.
pub fn validated<T: Validate>(request: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = request?;
    let errors = body.validate();
    if errors.is_empty() {
        Ok(body)
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub fn body<T>(request: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = request?;
    Ok(body)
}

pub async fn load<T: Entity>(state: &AppState, id: &str, label: &str) -> Result<T, ApiError> {
    state
        .repo
        .get::<T>(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} '{}'", label, id)))
}

pub async fn log_activity(
    state: &AppState,
    kind: ActivityKind,
    user: &CurrentUser,
    details: String,
    related_id: Option<&str>,
) -> Result<(), ApiError> {
    let entry = ActivityEntry::new(kind, user.id(), details, related_id);
    state.repo.insert(&entry).await?;
    Ok(())
}

/// Anchors the stored entity, then writes the activity entry.
///
/// A ledger failure surfaces as a 500; the entity stays persisted without anchor fields
/// and no activity is logged.
pub async fn anchor_and_log<T: Anchored>(
    state: &AppState,
    entity: &mut T,
    event_type: &str,
    user: &CurrentUser,
    kind: ActivityKind,
    details: String,
) -> Result<(), ApiError> {
    state.records.anchor(entity, event_type, user.id()).await?;
    let related = entity.id().to_string();
    log_activity(state, kind, user, details, Some(&related)).await
}

/// Hides records outside the caller's listing scope behind a 404.
pub fn ensure_visible<T: Entity>(scope: &Filter, entity: &T, label: &str) -> Result<(), ApiError> {
    let body = serde_json::to_value(entity).map_err(|e| ApiError::Internal(e.to_string()))?;
    if scope.matches(&body) {
        Ok(())
    } else {
        Err(ApiError::not_found(format!("{} '{}'", label, entity.id())))
    }
}
