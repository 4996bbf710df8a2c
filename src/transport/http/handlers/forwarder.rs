use crate::domain::access::Operation;
use crate::domain::model::{
    ActivityKind, ForwarderCoordination, NewCoordination, OperationStatusUpdate,
};
use crate::domain::status::{transition, StatusFlow};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{
    anchor_and_log, body, gate, load, log_activity, validated,
};
use crate::transport::http::types::{ApiError, AppState, CoordinationQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

fn coordination_filter(query: CoordinationQuery) -> Filter {
    match query.user_id {
        None => Filter::new().eq_opt("documentId", query.document_id),
        Some(user_id) => {
            let doc = query.document_id;
            Filter::new()
                .eq_opt("documentId", doc.clone())
                .eq("shipperId", user_id.as_str())
                .or()
                .eq_opt("documentId", doc.clone())
                .eq("carrierId", user_id.as_str())
                .or()
                .eq_opt("documentId", doc)
                .eq("createdBy", user_id.as_str())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/freight-forwarder/coordination",
    params(CoordinationQuery),
    responses((status = 200, description = "Coordinations, newest first", body = [ForwarderCoordination]))
)]
pub async fn list_coordinations_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CoordinationQuery>,
) -> Result<Json<Vec<ForwarderCoordination>>, ApiError> {
    Ok(Json(state.repo.list(&coordination_filter(query)).await?))
}

#[utoipa::path(
    post,
    path = "/api/freight-forwarder/coordination",
    request_body = NewCoordination,
    responses(
        (status = 201, description = "Coordination opened as pending and anchored", body = ForwarderCoordination),
        (status = 403, description = "Freight forwarders only", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_coordination_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewCoordination>, JsonRejection>,
) -> Result<(StatusCode, Json<ForwarderCoordination>), ApiError> {
    gate(&state, &user, Operation::CreateCoordination).await?;
    let payload = validated(request)?;
    let mut coordination = payload.into_coordination(user.id());
    state.repo.insert(&coordination).await?;
    let details = format!("Opened coordination {}", coordination.coordination_number);
    anchor_and_log(
        &state,
        &mut coordination,
        "coordination_created",
        &user,
        ActivityKind::CoordinationCreated,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(coordination)))
}

#[utoipa::path(
    patch,
    path = "/api/freight-forwarder/coordination/{id}/status",
    params(("id" = String, Path, description = "Coordination id")),
    request_body = OperationStatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = ForwarderCoordination),
        (status = 403, description = "Freight forwarders only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_coordination_status_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<OperationStatusUpdate>, JsonRejection>,
) -> Result<Json<ForwarderCoordination>, ApiError> {
    gate(&state, &user, Operation::UpdateCoordinationStatus).await?;
    let update = body(request)?;
    let mut coordination: ForwarderCoordination = load(&state, &id, "coordination").await?;
    coordination.status = transition(coordination.status, update.status)?;
    if update.notes.is_some() {
        coordination.notes = update.notes;
    }
    coordination.updated_at = Utc::now();
    state.repo.update(&coordination).await?;
    log_activity(
        &state,
        ActivityKind::CoordinationUpdated,
        &user,
        format!(
            "Coordination {} is {}",
            coordination.coordination_number,
            coordination.status.label()
        ),
        Some(&coordination.id),
    )
    .await?;
    Ok(Json(coordination))
}
