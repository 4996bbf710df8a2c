use crate::domain::access::Operation;
use crate::domain::model::{ActivityKind, NewPortOperation, OperationStatusUpdate, PortOperation};
use crate::domain::status::{transition, StatusFlow};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{
    anchor_and_log, body, gate, load, log_activity, validated,
};
use crate::transport::http::types::{ApiError, AppState, ShipmentScopeQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/api/port/operations",
    params(ShipmentScopeQuery),
    responses((status = 200, description = "Port operations, newest first", body = [PortOperation]))
)]
pub async fn list_port_operations_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ShipmentScopeQuery>,
) -> Result<Json<Vec<PortOperation>>, ApiError> {
    let filter = Filter::new()
        .eq_opt("shipmentId", query.shipment_id)
        .eq_opt("documentId", query.document_id);
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/port/operations",
    request_body = NewPortOperation,
    responses(
        (status = 201, description = "Operation recorded as pending and anchored", body = PortOperation),
        (status = 403, description = "Port authority only", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn record_port_operation_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewPortOperation>, JsonRejection>,
) -> Result<(StatusCode, Json<PortOperation>), ApiError> {
    gate(&state, &user, Operation::RecordPortOperation).await?;
    let payload = validated(request)?;
    let mut operation = payload.into_operation(user.id());
    state.repo.insert(&operation).await?;
    let details = format!(
        "Recorded {} {}",
        operation.operation_type.as_str(),
        operation.operation_number
    );
    anchor_and_log(
        &state,
        &mut operation,
        "port_operation_recorded",
        &user,
        ActivityKind::PortOperationRecorded,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(operation)))
}

#[utoipa::path(
    patch,
    path = "/api/port/operations/{id}/status",
    params(("id" = String, Path, description = "Port operation id")),
    request_body = OperationStatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = PortOperation),
        (status = 403, description = "Port authority only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_port_operation_status_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<OperationStatusUpdate>, JsonRejection>,
) -> Result<Json<PortOperation>, ApiError> {
    gate(&state, &user, Operation::UpdatePortOperationStatus).await?;
    let update = body(request)?;
    let mut operation: PortOperation = load(&state, &id, "port operation").await?;
    operation.status = transition(operation.status, update.status)?;
    if update.notes.is_some() {
        operation.notes = update.notes;
    }
    operation.updated_at = Utc::now();
    state.repo.update(&operation).await?;
    log_activity(
        &state,
        ActivityKind::PortOperationUpdated,
        &user,
        format!(
            "Operation {} is {}",
            operation.operation_number,
            operation.status.label()
        ),
        Some(&operation.id),
    )
    .await?;
    Ok(Json(operation))
}
