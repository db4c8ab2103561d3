//! Administrative review surface
//!
//! Cookie sessions, the `require_admin` guard, record listing, deletion and
//! CSV export. Admin identities live in their own table, separate from
//! registrations.

pub mod export;
pub mod handlers;
pub mod session;

pub use session::{AdminContext, SessionStore, SESSION_COOKIE};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::{AdminPrincipal, NewAdmin};
use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::password::hash_password;
use crate::state::AppState;
use crate::storage::{RegistrationStore, StoreError};

/// Reject requests without a live session; otherwise expose the
/// [`AdminContext`] as a request extension
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = session::token_from_headers(request.headers()) else {
        return ApiError::unauthorized("Admin login required").into_response();
    };
    let Some(context) = state.sessions.get(&token).await else {
        return ApiError::unauthorized("Session expired or invalid").into_response();
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

pub async fn create_admin(
    store: &dyn RegistrationStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AdminPrincipal, StoreError> {
    let admin = store
        .insert_admin(NewAdmin {
            admin_username: username.to_string(),
            admin_email: email.to_string(),
            password_hash: hash_password(password),
        })
        .await?;
    info!(admin_id = admin.id, username = %admin.admin_username, "admin account created");
    Ok(admin)
}

/// Create the configured default admin when it does not exist yet.
///
/// Returns the new principal, or `None` when nothing was created.
pub async fn ensure_default_admin(
    store: &dyn RegistrationStore,
    config: &AdminConfig,
) -> Result<Option<AdminPrincipal>, StoreError> {
    let Some(password) = config.default_password.as_deref() else {
        return Ok(None);
    };
    if store
        .find_admin_by_username(&config.default_username)
        .await?
        .is_some()
    {
        return Ok(None);
    }

    warn!(
        username = %config.default_username,
        "creating default admin from DEFAULT_ADMIN_PASSWORD; change this password"
    );
    create_admin(store, &config.default_username, &config.default_email, password)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use crate::storage::MemoryStore;

    fn config(password: Option<&str>) -> AdminConfig {
        AdminConfig {
            default_password: password.map(str::to_string),
            ..AdminConfig::default()
        }
    }

    #[tokio::test]
    async fn test_default_admin_is_seeded_once() {
        let store = MemoryStore::new();
        let created = ensure_default_admin(&store, &config(Some("S3cret!pass")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.admin_username, "admin");
        assert!(verify_password("S3cret!pass", &created.password_hash));

        let again = ensure_default_admin(&store, &config(Some("S3cret!pass")))
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_no_password_means_no_seed() {
        let store = MemoryStore::new();
        assert!(ensure_default_admin(&store, &config(None)).await.unwrap().is_none());
        assert!(store.find_admin_by_username("admin").await.unwrap().is_none());
    }
}
