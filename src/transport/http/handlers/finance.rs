use crate::domain::access::Operation;
use crate::domain::model::{ActivityKind, Document, NewTradeFinance, PaymentStatusUpdate, TradeFinance};
use crate::domain::role::Role;
use crate::domain::status::{transition, StatusFlow};
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

fn scope(user: &CurrentUser) -> Filter {
    match user.role() {
        Role::Admin | Role::Bank => Filter::new(),
        _ => Filter::new().eq("createdBy", user.id()),
    }
}

#[utoipa::path(
    get,
    path = "/api/trade-finance",
    responses((status = 200, description = "Trade finance records visible to the caller", body = [TradeFinance]))
)]
pub async fn list_trade_finance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TradeFinance>>, ApiError> {
    Ok(Json(state.repo.list(&scope(&user)).await?))
}

#[utoipa::path(
    post,
    path = "/api/trade-finance",
    request_body = NewTradeFinance,
    responses(
        (status = 201, description = "Record created and anchored", body = TradeFinance),
        (status = 403, description = "Shipper or bank only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown document", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_trade_finance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewTradeFinance>, JsonRejection>,
) -> Result<(StatusCode, Json<TradeFinance>), ApiError> {
    gate(&state, &user, Operation::CreateTradeFinance).await?;
    let payload = validated(request)?;
    let doc: Document = load(&state, &payload.document_id, "document").await?;
    let mut record = payload.into_record(user.id());
    state.repo.insert(&record).await?;
    let details = format!(
        "Opened {} {} financing for {}",
        record.amount, record.currency, doc.reference_number
    );
    anchor_and_log(
        &state,
        &mut record,
        "trade_finance_created",
        &user,
        ActivityKind::TradeFinanceCreated,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/trade-finance/{id}",
    params(("id" = String, Path, description = "Trade finance id")),
    responses(
        (status = 200, description = "The record", body = TradeFinance),
        (status = 404, description = "Unknown or not visible", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_trade_finance_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TradeFinance>, ApiError> {
    let record: TradeFinance = load(&state, &id, "trade finance").await?;
    ensure_visible(&scope(&user), &record, "trade finance")?;
    Ok(Json(record))
}

#[utoipa::path(
    patch,
    path = "/api/trade-finance/{id}/status",
    params(("id" = String, Path, description = "Trade finance id")),
    request_body = PaymentStatusUpdate,
    responses(
        (status = 200, description = "Payment status changed", body = TradeFinance),
        (status = 403, description = "Banks only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_trade_finance_status_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<PaymentStatusUpdate>, JsonRejection>,
) -> Result<Json<TradeFinance>, ApiError> {
    gate(&state, &user, Operation::UpdateTradeFinanceStatus).await?;
    let update = body(request)?;
    let mut record: TradeFinance = load(&state, &id, "trade finance").await?;
    record.payment_status = transition(record.payment_status, update.status)?;
    if update.notes.is_some() {
        record.notes = update.notes;
    }
    record.updated_at = Utc::now();
    state.repo.update(&record).await?;
    log_activity(
        &state,
        ActivityKind::TradeFinanceUpdated,
        &user,
        format!(
            "Payment {} for {}",
            record.payment_status.label(),
            record.lc_number.as_deref().unwrap_or(&record.id)
        ),
        Some(&record.id),
    )
    .await?;
    Ok(Json(record))
}
