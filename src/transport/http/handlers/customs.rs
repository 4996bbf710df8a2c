use crate::domain::access::Operation;
use crate::domain::model::{ActivityKind, CustomsClearance, Document, NewCustomsClearance, ReviewNotes};
use crate::domain::role::Role;
use crate::domain::status::{transition, ClearanceStatus};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{anchor_and_log, gate, load, log_activity, validated};
use crate::transport::http::types::{ApiError, AppState, ShipmentScopeQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/customs/clearances",
    params(ShipmentScopeQuery),
    responses((status = 200, description = "Clearances visible to the caller", body = [CustomsClearance]))
)]
pub async fn list_clearances_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ShipmentScopeQuery>,
) -> Result<Json<Vec<CustomsClearance>>, ApiError> {
    let mut filter = Filter::new()
        .eq_opt("shipmentId", query.shipment_id)
        .eq_opt("documentId", query.document_id);
    if !matches!(user.role(), Role::Admin | Role::Customs) {
        filter = filter.eq("createdBy", user.id());
    }
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/customs/clearances",
    request_body = NewCustomsClearance,
    responses(
        (status = 201, description = "Clearance requested and anchored", body = CustomsClearance),
        (status = 403, description = "Shipper or freight forwarder only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown document", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn request_clearance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewCustomsClearance>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomsClearance>), ApiError> {
    gate(&state, &user, Operation::RequestCustomsClearance).await?;
    let payload = validated(request)?;
    let doc: Document = load(&state, &payload.document_id, "document").await?;
    let mut clearance = payload.into_clearance(user.id());
    state.repo.insert(&clearance).await?;
    let details = format!(
        "Requested clearance {} for {}",
        clearance.clearance_number, doc.reference_number
    );
    anchor_and_log(
        &state,
        &mut clearance,
        "clearance_requested",
        &user,
        ActivityKind::CustomsClearanceRequested,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(clearance)))
}

// The notes body is optional on approve / reject.
fn optional_notes(request: Result<Json<ReviewNotes>, JsonRejection>) -> Result<Option<String>, ApiError> {
    match request {
        Ok(Json(body)) => Ok(body.notes),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn review(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    decision: ClearanceStatus,
    notes: Option<String>,
) -> Result<CustomsClearance, ApiError> {
    let mut clearance: CustomsClearance = load(state, id, "clearance").await?;
    transition(clearance.status, decision)?;
    clearance.review(decision, notes, user.id());
    state.repo.update(&clearance).await?;
    let (kind, verb) = match decision {
        ClearanceStatus::Approved => (ActivityKind::CustomsClearanceApproved, "Approved"),
        _ => (ActivityKind::CustomsClearanceRejected, "Rejected"),
    };
    log_activity(
        state,
        kind,
        user,
        format!("{} clearance {}", verb, clearance.clearance_number),
        Some(&clearance.id),
    )
    .await?;
    Ok(clearance)
}

#[utoipa::path(
    patch,
    path = "/api/customs/clearances/{id}/approve",
    params(("id" = String, Path, description = "Clearance id")),
    request_body(content = ReviewNotes, description = "Optional officer notes"),
    responses(
        (status = 200, description = "Clearance approved", body = CustomsClearance),
        (status = 403, description = "Customs only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Already decided", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn approve_clearance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<ReviewNotes>, JsonRejection>,
) -> Result<Json<CustomsClearance>, ApiError> {
    gate(&state, &user, Operation::ReviewCustomsClearance).await?;
    let notes = optional_notes(request)?;
    Ok(Json(
        review(&state, &user, &id, ClearanceStatus::Approved, notes).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/customs/clearances/{id}/reject",
    params(("id" = String, Path, description = "Clearance id")),
    request_body(content = ReviewNotes, description = "Optional officer notes"),
    responses(
        (status = 200, description = "Clearance rejected", body = CustomsClearance),
        (status = 403, description = "Customs only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Already decided", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn reject_clearance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<ReviewNotes>, JsonRejection>,
) -> Result<Json<CustomsClearance>, ApiError> {
    gate(&state, &user, Operation::ReviewCustomsClearance).await?;
    let notes = optional_notes(request)?;
    Ok(Json(
        review(&state, &user, &id, ClearanceStatus::Rejected, notes).await?,
    ))
}
