use crate::app::record_hash::{RecordError, RecordHashService};
use crate::domain::access::AccessDenied;
use crate::domain::model::FieldError;
use crate::domain::role::Role;
use crate::domain::status::TransitionError;
use crate::infra::ledger::LedgerError;
use crate::storage::{Repository, StoreError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub records: RecordHashService,
    /// User ids promoted to admin the first time they are seen.
    pub admin_ids: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(repo: Repository, records: RecordHashService, admin_ids: HashSet<String>) -> Self {
        Self {
            repo,
            records,
            admin_ids: Arc::new(admin_ids),
        }
    }
}

/// Body of every error response.
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("authentication required")]
    Unauthorized,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("blockchain recording failed")]
    Ledger(#[source] LedgerError),
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Transition(_) => StatusCode::CONFLICT,
            ApiError::Ledger(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => ApiError::Conflict(format!("{} already exists", what)),
            StoreError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Ledger(e) => ApiError::Ledger(e),
            RecordError::Store(e) => ApiError::from(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ApiError::Validation(errors) => ErrorBody {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            ApiError::Ledger(e) => {
                error!(error = %e, "ledger call failed");
                ErrorBody {
                    message,
                    errors: None,
                }
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                ErrorBody {
                    message,
                    errors: None,
                }
            }
            _ => ErrorBody {
                message,
                errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum number of rows (default 50, capped at 500).
    pub limit: Option<usize>,
}

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

impl LimitQuery {
    pub fn effective(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClaimQuery {
    pub policy_id: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipmentScopeQuery {
    pub shipment_id: Option<String>,
    pub document_id: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CoordinationQuery {
    pub document_id: Option<String>,
    /// Matches coordinations where the user is the shipper, the carrier or the forwarder.
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub entity_type: String,
    pub entity_id: String,
    pub verified: bool,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub ledger: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::{authorize, Operation};

    #[test]
    fn error_kinds_map_to_status_codes() {
        let denied = authorize(Role::Shipper, Operation::ReviewCustomsClearance).unwrap_err();
        assert_eq!(ApiError::from(denied).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(StoreError::Conflict("documents 'BL-1'".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RecordError::Ledger(LedgerError::Rpc("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(LimitQuery::default().effective(), 50);
        assert_eq!(LimitQuery { limit: Some(10_000) }.effective(), 500);
        assert_eq!(LimitQuery { limit: Some(0) }.effective(), 1);
    }
}
