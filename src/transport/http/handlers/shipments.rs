use crate::domain::access::Operation;
use crate::domain::model::{ActivityKind, Document, NewShipment, Shipment, TrackingUpdate};
use crate::domain::status::{transition, ShipmentStatus, StatusFlow, TransitionError};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{
    anchor_and_log, gate, load, log_activity, validated,
};
use crate::transport::http::types::{ApiError, AppState, ShipmentScopeQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/shipments",
    params(ShipmentScopeQuery),
    responses((status = 200, description = "Shipments, newest first", body = [Shipment]))
)]
pub async fn list_shipments_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ShipmentScopeQuery>,
) -> Result<Json<Vec<Shipment>>, ApiError> {
    let filter = Filter::new()
        .eq_opt("documentId", query.document_id)
        .eq_opt("id", query.shipment_id);
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/shipments",
    request_body = NewShipment,
    responses(
        (status = 201, description = "Shipment booked and anchored", body = Shipment),
        (status = 403, description = "Carriers only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown document", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Container already has a shipment", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_shipment_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewShipment>, JsonRejection>,
) -> Result<(StatusCode, Json<Shipment>), ApiError> {
    gate(&state, &user, Operation::CreateShipment).await?;
    let payload = validated(request)?;
    let doc: Document = load(&state, &payload.document_id, "document").await?;
    let container = payload.container_number.map(|c| c.trim().to_uppercase());
    let mut shipment = Shipment::start(
        &doc.id,
        container,
        &payload.origin,
        &payload.destination,
        ShipmentStatus::Booked,
        payload.estimated_arrival,
        format!("Booked under {}", doc.reference_number),
        user.id(),
    );
    state.repo.insert(&shipment).await?;
    let details = format!(
        "Booked shipment {} from {} to {}",
        shipment.container_number.as_deref().unwrap_or("(no container)"),
        shipment.origin,
        shipment.destination
    );
    anchor_and_log(
        &state,
        &mut shipment,
        "shipment_created",
        &user,
        ActivityKind::ShipmentCreated,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    params(("id" = String, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "The shipment", body = Shipment),
        (status = 404, description = "Unknown shipment", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_shipment_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    Ok(Json(load(&state, &id, "shipment").await?))
}

#[utoipa::path(
    get,
    path = "/api/shipments/container/{container}",
    params(("container" = String, Path, description = "Container number, case-insensitive")),
    responses(
        (status = 200, description = "The container's shipment", body = Shipment),
        (status = 404, description = "No shipment for this container", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_shipment_by_container_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(container): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    let container = container.trim().to_uppercase();
    state
        .repo
        .find_unique::<Shipment>(&container)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("shipment for container '{}'", container)))
}

#[utoipa::path(
    patch,
    path = "/api/shipments/{id}/tracking",
    params(("id" = String, Path, description = "Shipment id")),
    request_body = TrackingUpdate,
    responses(
        (status = 200, description = "Tracking applied, event appended", body = Shipment),
        (status = 403, description = "Carrier or port authority only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Shipment already delivered", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_tracking_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<TrackingUpdate>, JsonRejection>,
) -> Result<Json<Shipment>, ApiError> {
    gate(&state, &user, Operation::UpdateShipmentTracking).await?;
    let update = validated(request)?;
    let mut shipment: Shipment = load(&state, &id, "shipment").await?;

    let current = shipment.current_status;
    if current.is_terminal() {
        let to = update.status.unwrap_or(current);
        return Err(TransitionError {
            from: current.label(),
            to: to.label(),
        }
        .into());
    }
    if let Some(next) = update.status {
        if next != current {
            transition(current, next)?;
        }
    }

    shipment.apply_tracking(update, user.id());
    state.repo.update(&shipment).await?;
    log_activity(
        &state,
        ActivityKind::ShipmentUpdated,
        &user,
        format!(
            "Shipment {} is {} at {}",
            shipment.container_number.as_deref().unwrap_or(&shipment.id),
            shipment.current_status.label(),
            shipment.current_location
        ),
        Some(&shipment.id),
    )
    .await?;
    Ok(Json(shipment))
}
