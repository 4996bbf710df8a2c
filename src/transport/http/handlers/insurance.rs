use crate::domain::access::Operation;
use crate::domain::model::{
    ActivityKind, ClaimReview, Document, InsuranceClaim, InsurancePolicy, NewInsuranceClaim,
    NewInsurancePolicy, PolicyStatusUpdate,
};
use crate::domain::role::Role;
use crate::domain::status::{transition, PolicyStatus, StatusFlow};
use crate::storage::Filter;
use crate::transport::http::auth::CurrentUser;
use crate::transport::http::handlers::common::{
    anchor_and_log, body, ensure_visible, gate, load, log_activity, validated,
};
use crate::transport::http::types::{ApiError, AppState, ClaimQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

fn policy_scope(user: &CurrentUser) -> Filter {
    match user.role() {
        Role::Admin | Role::Insurer => Filter::new(),
        _ => Filter::new()
            .eq("insuredId", user.id())
            .or()
            .eq("createdBy", user.id()),
    }
}

fn claim_scope(user: &CurrentUser, policy_id: Option<String>) -> Filter {
    match user.role() {
        Role::Admin | Role::Insurer => Filter::new().eq_opt("policyId", policy_id),
        _ => Filter::new()
            .eq_opt("policyId", policy_id)
            .eq("createdBy", user.id()),
    }
}

#[utoipa::path(
    get,
    path = "/api/insurance/policies",
    responses((status = 200, description = "Policies visible to the caller", body = [InsurancePolicy]))
)]
pub async fn list_policies_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<InsurancePolicy>>, ApiError> {
    Ok(Json(state.repo.list(&policy_scope(&user)).await?))
}

#[utoipa::path(
    post,
    path = "/api/insurance/policies",
    request_body = NewInsurancePolicy,
    responses(
        (status = 201, description = "Policy issued and anchored", body = InsurancePolicy),
        (status = 403, description = "Insurers only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Policy number already used", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_policy_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewInsurancePolicy>, JsonRejection>,
) -> Result<(StatusCode, Json<InsurancePolicy>), ApiError> {
    gate(&state, &user, Operation::CreateInsurancePolicy).await?;
    let payload = validated(request)?;
    if let Some(document_id) = payload.document_id.as_deref() {
        load::<Document>(&state, document_id, "document").await?;
    }
    let mut policy = payload.into_policy(user.id());
    state.repo.insert(&policy).await?;
    let details = format!(
        "Issued policy {} covering {} {}",
        policy.policy_number, policy.coverage_amount, policy.currency
    );
    anchor_and_log(
        &state,
        &mut policy,
        "policy_issued",
        &user,
        ActivityKind::InsurancePolicyCreated,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

#[utoipa::path(
    get,
    path = "/api/insurance/policies/{id}",
    params(("id" = String, Path, description = "Policy id")),
    responses(
        (status = 200, description = "The policy", body = InsurancePolicy),
        (status = 404, description = "Unknown or not visible", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn get_policy_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<InsurancePolicy>, ApiError> {
    let policy: InsurancePolicy = load(&state, &id, "policy").await?;
    ensure_visible(&policy_scope(&user), &policy, "policy")?;
    Ok(Json(policy))
}

#[utoipa::path(
    patch,
    path = "/api/insurance/policies/{id}/status",
    params(("id" = String, Path, description = "Policy id")),
    request_body = PolicyStatusUpdate,
    responses(
        (status = 200, description = "Policy status changed", body = InsurancePolicy),
        (status = 403, description = "Insurers only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn update_policy_status_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<PolicyStatusUpdate>, JsonRejection>,
) -> Result<Json<InsurancePolicy>, ApiError> {
    gate(&state, &user, Operation::UpdateInsurancePolicyStatus).await?;
    let update = body(request)?;
    let mut policy: InsurancePolicy = load(&state, &id, "policy").await?;
    policy.status = transition(policy.status, update.status)?;
    policy.updated_at = Utc::now();
    state.repo.update(&policy).await?;
    log_activity(
        &state,
        ActivityKind::InsurancePolicyUpdated,
        &user,
        format!("Policy {} is now {}", policy.policy_number, policy.status.label()),
        Some(&policy.id),
    )
    .await?;
    Ok(Json(policy))
}

#[utoipa::path(
    get,
    path = "/api/insurance/claims",
    params(ClaimQuery),
    responses((status = 200, description = "Claims visible to the caller", body = [InsuranceClaim]))
)]
pub async fn list_claims_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<Vec<InsuranceClaim>>, ApiError> {
    let filter = claim_scope(&user, query.policy_id);
    Ok(Json(state.repo.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/insurance/claims",
    request_body = NewInsuranceClaim,
    responses(
        (status = 201, description = "Claim submitted and anchored", body = InsuranceClaim),
        (status = 403, description = "Shipper or carrier only", body = crate::transport::http::types::ErrorBody),
        (status = 404, description = "Unknown policy", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Policy is not active", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn submit_claim_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Result<Json<NewInsuranceClaim>, JsonRejection>,
) -> Result<(StatusCode, Json<InsuranceClaim>), ApiError> {
    gate(&state, &user, Operation::SubmitInsuranceClaim).await?;
    let payload = validated(request)?;
    let policy: InsurancePolicy = load(&state, &payload.policy_id, "policy").await?;
    if policy.status != PolicyStatus::Active {
        return Err(ApiError::Conflict(format!(
            "policy {} is {}",
            policy.policy_number,
            policy.status.label()
        )));
    }
    let mut claim = payload.into_claim(user.id());
    state.repo.insert(&claim).await?;
    let details = format!(
        "Claimed {} against policy {}",
        claim.claim_amount, policy.policy_number
    );
    anchor_and_log(
        &state,
        &mut claim,
        "claim_submitted",
        &user,
        ActivityKind::InsuranceClaimSubmitted,
        details,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(claim)))
}

#[utoipa::path(
    patch,
    path = "/api/insurance/claims/{id}/status",
    params(("id" = String, Path, description = "Claim id")),
    request_body = ClaimReview,
    responses(
        (status = 200, description = "Claim reviewed", body = InsuranceClaim),
        (status = 403, description = "Insurers only", body = crate::transport::http::types::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn review_claim_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    request: Result<Json<ClaimReview>, JsonRejection>,
) -> Result<Json<InsuranceClaim>, ApiError> {
    gate(&state, &user, Operation::ReviewInsuranceClaim).await?;
    let review = body(request)?;
    let mut claim: InsuranceClaim = load(&state, &id, "claim").await?;
    claim.status = transition(claim.status, review.status)?;
    if review.resolution_notes.is_some() {
        claim.resolution_notes = review.resolution_notes;
    }
    let now = Utc::now();
    claim.reviewed_by = Some(user.id().to_string());
    claim.reviewed_at = Some(now);
    claim.updated_at = now;
    state.repo.update(&claim).await?;
    log_activity(
        &state,
        ActivityKind::InsuranceClaimReviewed,
        &user,
        format!("Claim {} marked {}", claim.claim_number, claim.status.label()),
        Some(&claim.id),
    )
    .await?;
    Ok(Json(claim))
}
