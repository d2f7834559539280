//! Role-gated extractor for elevated routes.
//!
//! Create, update, and status-change routes require an admin session; list
//! and detail only require authentication. Using an extractor (rather than
//! a router layer) keeps the requirement visible in each handler signature.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// An authenticated user that has been checked for the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. Admin role required for this operation",
            ));
        }

        Ok(AdminUser(auth_user))
    }
}
