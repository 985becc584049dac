use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body;
/// ownership checks compare `user_id` against the resource's author.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

fn verify_bearer(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    let claims = jwt::verify(token, &state.config.auth.jwt_secret)
        .map_err(|_| AppError::TokenInvalid)?;

    Ok(AuthUser {
        user_id: claims.uid,
        username: claims.sub,
        role: claims.role,
        permissions: claims.permissions,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        verify_bearer(parts, state)
    }
}

/// Viewer identity for endpoints that serve anonymous requests but decorate
/// their output when an actor is present (e.g. `liked_by_viewer`).
///
/// A missing header yields `None`; a header that is present but invalid is
/// still rejected rather than silently downgraded to anonymous.
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get("Authorization").is_none() {
            return Ok(OptionalAuthUser(None));
        }
        verify_bearer(parts, state).map(|user| OptionalAuthUser(Some(user)))
    }
}
