//! Shipping instructions and bills of lading.

use crate::domain::access::Operation;
use crate::domain::model::{
    ActivityKind, Document, DocumentKind, DocumentStatusUpdate, NewDocument, ShareRequest,
    Shipment,
};
use crate::domain::role::Role;
use crate::domain::status::{transition, DocumentStatus, ShipmentStatus, StatusFlow};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{
    anchor_and_log, body, ensure_visible, gate, load, log_activity, validated,
};
use crate::transport::http::types::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub document: Document,
    /// Shipments opened by this finalization.
    pub shipments: Vec<Shipment>,
}

fn scope(kind: DocumentKind, user: &CurrentUser) -> Filter {
    let base = Filter::new().eq("kind", serde_json::json!(kind));
    match (kind, user.role()) {
        (_, Role::Admin) => base,
        (DocumentKind::ShippingInstruction, Role::Carrier) => base,
        (DocumentKind::BillOfLading, Role::Customs) => base.eq("sharedWithCustoms", true),
        (DocumentKind::BillOfLading, Role::PortAuthority) => base.eq("sharedWithPort", true),
        _ => base.eq("createdBy", user.id()),
    }
}

async fn load_kind(
    state: &AppState,
    id: &str,
    kind: DocumentKind,
) -> Result<Document, ApiError> {
    let doc: Document = load(state, id, kind.label()).await?;
    if doc.kind != kind {
        return Err(ApiError::not_found(format!("{} '{}'", kind.label(), id)));
    }
    Ok(doc)
}

#[utoipa::path(
    get,
    path = "/api/shipping-instructions",
    responses((status = 200, description = "Shipping instructions visible to the caller", body = [Document]))
)]
pub async fn list_shipping_instructions_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, ApiError> {
    let filter = scope(DocumentKind::ShippingInstruction, &user);
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/shipping-instructions",
    request_body = NewDocument,
    responses(
        (status = 201, description = "Instruction submitted and anchored", body = Document),
        (status = 400, description = "Validation failed", body = crate::transport::http::types::ErrorBody),
        (status = 403, description = "Shippers only", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Ledger failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_shipping_instruction_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewDocument>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    gate(&state, &user, Operation::CreateShippingInstruction).await?;
    let payload = validated(request)?;
    let mut doc = payload.into_document(
        DocumentKind::ShippingInstruction,
        DocumentStatus::Submitted,
        user.id(),
    );
    state.repo.insert(&doc).await?;
    let details = format!("Submitted shipping instruction {}", doc.reference_number);
    anchor_and_log(
        &state,
        &mut doc,
        "si_submitted",
        &user,
        ActivityKind::ShippingInstructionCreated,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

#[utoipa::path(
    get,
    path = "/api/shipping-instructions/{id}",
    params(("id" = String, Path, description = "Instruction id")),
    responses(
        (status = 200, description = "The instruction", body = Document),
        (status = 404, description = "Unknown or not visible", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_shipping_instruction_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let doc = load_kind(&state, &id, DocumentKind::ShippingInstruction).await?;
    ensure_visible(&scope(DocumentKind::ShippingInstruction, &user), &doc, "shipping instruction")?;
    Ok(Json(doc))
}

#[utoipa::path(
    get,
    path = "/api/bills-of-lading",
    responses((status = 200, description = "Bills of lading visible to the caller", body = [Document]))
)]
pub async fn list_bills_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, ApiError> {
    let filter = scope(DocumentKind::BillOfLading, &user);
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/bills-of-lading",
    request_body = NewDocument,
    responses(
        (status = 201, description = "Draft bill of lading", body = Document),
        (status = 400, description = "Validation failed", body = crate::transport::http::types::ErrorBody),
        (status = 403, description = "Carriers only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "B/L number already used", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_bill_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewDocument>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    gate(&state, &user, Operation::CreateBillOfLading).await?;
    let payload = validated(request)?;
    if let Some(instruction_id) = payload.instruction_id.as_deref() {
        load_kind(&state, instruction_id, DocumentKind::ShippingInstruction).await?;
    }
    let doc = payload.into_document(DocumentKind::BillOfLading, DocumentStatus::Draft, user.id());
    state.repo.insert(&doc).await?;
    log_activity(
        &state,
        ActivityKind::BillOfLadingCreated,
        &user,
        format!("Drafted B/L {}", doc.reference_number),
        Some(&doc.id),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

#[utoipa::path(
    get,
    path = "/api/bills-of-lading/{id}",
    params(("id" = String, Path, description = "Bill of lading id")),
    responses(
        (status = 200, description = "The bill of lading", body = Document),
        (status = 404, description = "Unknown or not visible", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_bill_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let doc = load_kind(&state, &id, DocumentKind::BillOfLading).await?;
    ensure_visible(&scope(DocumentKind::BillOfLading, &user), &doc, "B/L")?;
    Ok(Json(doc))
}

/// Opens an in-transit shipment for every listed container that has none yet.
async fn open_shipments(
    state: &AppState,
    doc: &Document,
    user: &CurrentUser,
) -> Result<Vec<Shipment>, ApiError> {
    let description = format!(
        "Departed {} under B/L {}",
        doc.port_of_loading, doc.reference_number
    );
    let mut candidates = Vec::new();
    if doc.container_numbers.is_empty() {
        let existing: Vec<Shipment> = state
            .repo
            .recent(&Filter::new().eq("documentId", doc.id.as_str()), Some(1))
            .await?;
        if existing.is_empty() {
            candidates.push(None);
        }
    } else {
        let mut seen = HashSet::new();
        for container in &doc.container_numbers {
            if !seen.insert(container.as_str()) {
                continue;
            }
            if state.repo.find_unique::<Shipment>(container).await?.is_none() {
                candidates.push(Some(container.clone()));
            }
        }
    }

    let mut created = Vec::with_capacity(candidates.len());
    for container in candidates {
        let shipment = Shipment::start(
            &doc.id,
            container,
            &doc.port_of_loading,
            &doc.port_of_discharge,
            ShipmentStatus::InTransit,
            None,
            description.clone(),
            user.id(),
        );
        state.repo.insert(&shipment).await?;
        created.push(shipment);
    }
    Ok(created)
}

async fn finalize(
    state: &AppState,
    user: &CurrentUser,
    mut doc: Document,
) -> Result<FinalizeResponse, ApiError> {
    let next = transition(doc.status, DocumentStatus::Finalized)?;
    // A failed shipment insert must leave the B/L in its prior status.
    let shipments = open_shipments(state, &doc, user).await?;
    doc.status = next;
    let now = Utc::now();
    doc.issued_at = Some(now);
    doc.updated_at = now;
    state.repo.update(&doc).await?;

    let details = format!(
        "Finalized B/L {} ({} shipment(s) opened)",
        doc.reference_number,
        shipments.len()
    );
    anchor_and_log(
        state,
        &mut doc,
        "bl_finalized",
        user,
        ActivityKind::BillOfLadingFinalized,
        details,
    )
    .await?;
    Ok(FinalizeResponse {
        document: doc,
        shipments,
    })
}

#[utoipa::path(
    patch,
    path = "/api/bills-of-lading/{id}/finalize",
    params(("id" = String, Path, description = "Bill of lading id")),
    responses(
        (status = 200, description = "Finalized, anchored, shipments opened", body = FinalizeResponse),
        (status = 403, description = "Carriers only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown bill of lading", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Not in a finalizable state", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Ledger failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn finalize_bill_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    gate(&state, &user, Operation::FinalizeBillOfLading).await?;
    let doc = load_kind(&state, &id, DocumentKind::BillOfLading).await?;
    Ok(Json(finalize(&state, &user, doc).await?))
}

#[utoipa::path(
    patch,
    path = "/api/bills-of-lading/{id}/share",
    params(("id" = String, Path, description = "Bill of lading id")),
    request_body = ShareRequest,
    responses(
        (status = 200, description = "Sharing flags updated", body = Document),
        (status = 400, description = "Nothing to share with", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Not in a shareable state", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn share_bill_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<Document>, ApiError> {
    gate(&state, &user, Operation::ShareBillOfLading).await?;
    let share = body(request)?;
    if !share.customs && !share.port {
        return Err(ApiError::BadRequest(
            "share with customs, port or both".to_string(),
        ));
    }
    let mut doc = load_kind(&state, &id, DocumentKind::BillOfLading).await?;
    let newly_shared =
        (share.customs && !doc.shared_with_customs) || (share.port && !doc.shared_with_port);
    if doc.status != DocumentStatus::Shared {
        doc.status = transition(doc.status, DocumentStatus::Shared)?;
    } else if !newly_shared {
        return Err(ApiError::Conflict(format!(
            "B/L {} is already shared with the requested parties",
            doc.reference_number
        )));
    }
    doc.shared_with_customs |= share.customs;
    doc.shared_with_port |= share.port;
    doc.updated_at = Utc::now();
    state.repo.update(&doc).await?;

    let mut parties = Vec::new();
    if share.customs {
        parties.push("customs");
    }
    if share.port {
        parties.push("port authority");
    }
    log_activity(
        &state,
        ActivityKind::BillOfLadingShared,
        &user,
        format!("Shared B/L {} with {}", doc.reference_number, parties.join(" and ")),
        Some(&doc.id),
    )
    .await?;
    Ok(Json(doc))
}

#[utoipa::path(
    patch,
    path = "/api/bills-of-lading/{id}/deliver",
    params(("id" = String, Path, description = "Bill of lading id")),
    responses(
        (status = 200, description = "Marked delivered", body = Document),
        (status = 403, description = "Carrier or port authority only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Not deliverable from current status", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn deliver_bill_of_lading_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    gate(&state, &user, Operation::DeliverBillOfLading).await?;
    let mut doc = load_kind(&state, &id, DocumentKind::BillOfLading).await?;
    doc.status = transition(doc.status, DocumentStatus::Delivered)?;
    doc.updated_at = Utc::now();
    state.repo.update(&doc).await?;
    log_activity(
        &state,
        ActivityKind::BillOfLadingDelivered,
        &user,
        format!("Delivered B/L {}", doc.reference_number),
        Some(&doc.id),
    )
    .await?;
    Ok(Json(doc))
}

#[utoipa::path(
    patch,
    path = "/api/bills-of-lading/{id}/status",
    params(("id" = String, Path, description = "Bill of lading id")),
    request_body = DocumentStatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = Document),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_bill_of_lading_status_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<DocumentStatusUpdate>, JsonRejection>,
) -> Result<Json<Document>, ApiError> {
    gate(&state, &user, Operation::UpdateBillOfLadingStatus).await?;
    let update = body(request)?;
    let mut doc = load_kind(&state, &id, DocumentKind::BillOfLading).await?;

    // Finalizing through the generic route still anchors and opens shipments.
    if update.status == DocumentStatus::Finalized {
        return Ok(Json(finalize(&state, &user, doc).await?.document));
    }

    doc.status = transition(doc.status, update.status)?;
    doc.updated_at = Utc::now();
    state.repo.update(&doc).await?;
    log_activity(
        &state,
        ActivityKind::BillOfLadingStatusUpdated,
        &user,
        format!("B/L {} moved to {}", doc.reference_number, doc.status.label()),
        Some(&doc.id),
    )
    .await?;
    Ok(Json(doc))
}
