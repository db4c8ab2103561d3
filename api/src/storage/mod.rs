//! Storage collaborator
//!
//! The orchestrator, the interactive validator and the admin surface only
//! see [`RegistrationStore`]. Postgres backs production; the in-memory store
//! backs tests and local runs without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{AdminPrincipal, NewAdmin, NewRegistration, RegistrationRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("{field} '{value}' already exists")]
    Conflict { field: &'static str, value: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One page of registrations plus the total match count
#[derive(Debug, Clone)]
pub struct RegistrationPage {
    pub records: Vec<RegistrationRecord>,
    pub total: i64,
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Persist one record atomically; uniqueness is enforced here as well
    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, StoreError>;

    async fn get_registration(&self, id: i64) -> Result<Option<RegistrationRecord>, StoreError>;

    /// Newest first; `search` matches names, username and email case-insensitively
    async fn search_registrations(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<RegistrationPage, StoreError>;

    async fn all_registrations(&self) -> Result<Vec<RegistrationRecord>, StoreError>;

    /// Returns false when no record had that id
    async fn delete_registration(&self, id: i64) -> Result<bool, StoreError>;

    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminPrincipal>, StoreError>;

    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminPrincipal, StoreError>;

    async fn record_admin_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Offset for a 1-based page number, saturating for absurd pages
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(0))
}
