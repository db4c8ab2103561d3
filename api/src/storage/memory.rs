use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{AdminPrincipal, NewAdmin, NewRegistration, RegistrationRecord};
use tokio::sync::RwLock;

use super::{page_offset, RegistrationPage, RegistrationStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<RegistrationRecord>,
    admins: Vec<AdminPrincipal>,
    last_user_id: i64,
    last_admin_id: i64,
}

/// Process-local store with the same uniqueness semantics as Postgres
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn registration_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

fn matches_search(record: &RegistrationRecord, needle: &str) -> bool {
    [
        &record.first_name,
        &record.last_name,
        &record.username,
        &record.email,
    ]
    .iter()
    .any(|value| value.to_lowercase().contains(needle))
}

fn newest_first(records: &mut [RegistrationRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.email == email))
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == registration.username) {
            return Err(StoreError::Conflict {
                field: "username",
                value: registration.username,
            });
        }
        if tables.users.iter().any(|u| u.email == registration.email) {
            return Err(StoreError::Conflict {
                field: "email",
                value: registration.email,
            });
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let record = RegistrationRecord {
            id: tables.last_user_id,
            first_name: registration.first_name,
            last_name: registration.last_name,
            username: registration.username,
            email: registration.email,
            mobile: registration.mobile,
            dob: registration.dob,
            age: registration.age,
            gender: registration.gender,
            address: registration.address,
            postal_code: registration.postal_code,
            country: registration.country,
            state: registration.state,
            city: registration.city,
            education: registration.education,
            profile_photo: Some(registration.profile_photo),
            security_question: registration.security_question,
            security_answer: registration.security_answer,
            password_hash: registration.password_hash,
            guardian_name: registration.guardian_name,
            guardian_email: registration.guardian_email,
            guardian_phone: registration.guardian_phone,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn get_registration(&self, id: i64) -> Result<Option<RegistrationRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn search_registrations(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<RegistrationPage, StoreError> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let tables = self.tables.read().await;
        let mut matching: Vec<RegistrationRecord> = tables
            .users
            .iter()
            .filter(|u| needle.as_deref().map_or(true, |n| matches_search(u, n)))
            .cloned()
            .collect();
        newest_first(&mut matching);

        let total = matching.len() as i64;
        let offset = page_offset(page, per_page).max(0) as usize;
        let records = matching
            .into_iter()
            .skip(offset)
            .take(per_page.max(0) as usize)
            .collect();

        Ok(RegistrationPage { records, total })
    }

    async fn all_registrations(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let mut records = self.tables.read().await.users.clone();
        newest_first(&mut records);
        Ok(records)
    }

    async fn delete_registration(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }

    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminPrincipal>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .iter()
            .find(|a| a.admin_username == username)
            .cloned())
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminPrincipal, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .admins
            .iter()
            .any(|a| a.admin_username == admin.admin_username)
        {
            return Err(StoreError::Conflict {
                field: "admin_username",
                value: admin.admin_username,
            });
        }
        if tables.admins.iter().any(|a| a.admin_email == admin.admin_email) {
            return Err(StoreError::Conflict {
                field: "admin_email",
                value: admin.admin_email,
            });
        }

        tables.last_admin_id += 1;
        let principal = AdminPrincipal {
            id: tables.last_admin_id,
            admin_username: admin.admin_username,
            admin_email: admin.admin_email,
            password_hash: admin.password_hash,
            last_login: None,
            created_at: Utc::now(),
        };
        tables.admins.push(principal.clone());
        Ok(principal)
    }

    async fn record_admin_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(admin) = tables.admins.iter_mut().find(|a| a.id == id) {
            admin.last_login = Some(at);
        }
        Ok(())
    }
}
