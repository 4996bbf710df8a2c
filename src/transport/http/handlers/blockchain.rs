use crate::domain::model::{BlockchainTransactionRecord, EntityKind, NetworkStatus};
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::types::{ApiError, AppState, LimitQuery, VerifyResponse};
use axum::extract::{Path, Query, State};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/blockchain/status",
    responses((status = 200, description = "Ledger connectivity; disconnected when unreachable", body = NetworkStatus))
)]
pub async fn network_status_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<NetworkStatus> {
    Json(state.records.network_status().await)
}

#[utoipa::path(
    get,
    path = "/api/blockchain/transactions",
    params(LimitQuery),
    responses((status = 200, description = "Recorded ledger submissions, newest first", body = [BlockchainTransactionRecord]))
)]
pub async fn list_transactions_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BlockchainTransactionRecord>>, ApiError> {
    Ok(Json(state.records.transactions(Some(query.effective())).await?))
}

#[utoipa::path(
    get,
    path = "/api/blockchain/transactions/{txHash}",
    params(("txHash" = String, Path, description = "Ledger transaction hash")),
    responses(
        (status = 200, description = "The recorded submission", body = BlockchainTransactionRecord),
        (status = 404, description = "Unknown transaction", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_transaction_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(tx_hash): Path<String>,
) -> Result<Json<BlockchainTransactionRecord>, ApiError> {
    state
        .records
        .transaction(&tx_hash)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("transaction '{}'", tx_hash)))
}

#[utoipa::path(
    get,
    path = "/api/blockchain/verify/{entityType}/{id}",
    params(
        ("entityType" = String, Path, description = "e.g. document, shipment, trade_finance"),
        ("id" = String, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Whether the ledger holds a fingerprint for the entity", body = VerifyResponse),
        (status = 400, description = "Unknown entity type", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let kind: EntityKind = entity_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown entity type '{}'", entity_type)))?;
    let verified = state.records.verify_document(kind, &id).await?;
    Ok(Json(VerifyResponse {
        entity_type: kind.as_str().to_string(),
        entity_id: id,
        verified,
    }))
}
