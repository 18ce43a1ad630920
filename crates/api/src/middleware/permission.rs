//! Permission-gated extractors.
//!
//! [`RequirePermission<G>`] wraps [`AuthUser`] and rejects requests whose
//! user does not hold `G::PERMISSION`: 401 without a session, 403 without
//! the permission. Each 403 is recorded as a warning-level security event.
//!
//! ```ignore
//! async fn delete(
//!     RequirePermission { user, .. }: RequirePermission<TemplatesDelete>,
//! ) -> AppResult<StatusCode> {
//!     Ok(StatusCode::NO_CONTENT)
//! }
//! ```

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jobs2go_core::error::CoreError;
use jobs2go_core::monitoring::Severity;
use jobs2go_core::permissions::Permission;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Message for every 403 raised by a permission gate.
pub const FORBIDDEN: &str = "Forbidden";

/// Type-level name of a required permission.
pub trait PermissionGate: Send + Sync + 'static {
    const PERMISSION: Permission;
}

/// Requires the session user to hold `G::PERMISSION`.
pub struct RequirePermission<G: PermissionGate> {
    pub user: AuthUser,
    _gate: PhantomData<G>,
}

impl<G: PermissionGate> FromRequestParts<AppState> for RequirePermission<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !state
            .permissions
            .has_permission(G::PERMISSION, Some(user.user_id))
            .await
        {
            tracing::debug!(
                user_id = user.user_id,
                permission = %G::PERMISSION,
                "Permission denied",
            );
            state
                .monitoring
                .track_security_event(
                    format!("Permission denied: {}", G::PERMISSION),
                    Severity::Warning,
                    Some(user.user_id.to_string()),
                )
                .await;
            return Err(AppError::Core(CoreError::Forbidden(FORBIDDEN.into())));
        }
        Ok(RequirePermission {
            user,
            _gate: PhantomData,
        })
    }
}

macro_rules! gates {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Gate for [`Permission::", stringify!($name), "`].")]
            pub struct $name;

            impl PermissionGate for $name {
                const PERMISSION: Permission = Permission::$name;
            }
        )*
    };
}

gates!(
    AdminAccess,
    TemplatesRead,
    TemplatesWrite,
    TemplatesDelete,
    SourceMapsRead,
    SourceMapsWrite,
    SourceMapsDelete,
    RolesWrite,
);
