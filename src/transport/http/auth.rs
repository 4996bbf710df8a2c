//! Session extraction.
//!
//! The identity proxy in front of the service authenticates users and forwards
//! their id and profile as headers. An unknown id is stored on its first read, or
//! on its first write that passes the role gate; afterwards the role always comes
//! from the stored record.

use crate::domain::model::User;
use crate::domain::role::Role;
use crate::storage::StoreError;
use crate::transport::http::types::{ApiError, AppState};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use tracing::info;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_FIRST_NAME_HEADER: &str = "x-user-first-name";
pub const USER_LAST_NAME_HEADER: &str = "x-user-last-name";
pub const USER_COMPANY_HEADER: &str = "x-user-company";

/// The authenticated caller.
///
/// A first-seen caller on a mutating request is held unsaved until a role gate
/// lets the request through, so a rejected request writes nothing.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    user: User,
    stored: bool,
}

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn into_user(self) -> User {
        self.user
    }

    /// Stores a first-seen caller. A no-op once the row exists.
    pub async fn register(&self, state: &AppState) -> Result<(), ApiError> {
        if self.stored {
            return Ok(());
        }
        match state.repo.insert(&self.user).await {
            Ok(()) => {
                info!(user_id = %self.user.id, role = %self.user.role, "registered new user");
                Ok(())
            }
            // Two first requests raced; the other one created the row.
            Err(StoreError::Conflict(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Copies any profile headers onto `user`; returns true when something changed.
fn apply_profile(user: &mut User, headers: &HeaderMap) -> bool {
    let mut changed = false;
    let fields = [
        (USER_EMAIL_HEADER, &mut user.email),
        (USER_FIRST_NAME_HEADER, &mut user.first_name),
        (USER_LAST_NAME_HEADER, &mut user.last_name),
        (USER_COMPANY_HEADER, &mut user.company_name),
    ];
    for (name, slot) in fields {
        if let Some(value) = header(headers, name) {
            if slot.as_deref() != Some(value.as_str()) {
                *slot = Some(value);
                changed = true;
            }
        }
    }
    changed
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = header(&parts.headers, USER_ID_HEADER).ok_or(ApiError::Unauthorized)?;

        if let Some(mut user) = state.repo.get::<User>(&id).await? {
            // Profile refreshes ride on reads so a refused write touches nothing.
            if parts.method.is_safe() && apply_profile(&mut user, &parts.headers) {
                user.updated_at = Utc::now();
                state.repo.update(&user).await?;
            }
            return Ok(CurrentUser { user, stored: true });
        }

        let role = if state.admin_ids.contains(&id) {
            Role::Admin
        } else {
            Role::Shipper
        };
        let mut user = User::new(id.clone(), role);
        apply_profile(&mut user, &parts.headers);
        let caller = CurrentUser { user, stored: false };
        if !parts.method.is_safe() {
            return Ok(caller);
        }
        caller.register(state).await?;
        // Re-read in case a concurrent first request stored the row.
        let user = state.repo.get::<User>(&id).await?.ok_or(ApiError::Unauthorized)?;
        Ok(CurrentUser { user, stored: true })
    }
}
