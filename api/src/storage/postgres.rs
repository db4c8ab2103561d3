use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{AdminPrincipal, NewAdmin, NewRegistration, RegistrationRecord};
use sqlx::PgPool;
use tracing::{debug, error};

use super::{page_offset, RegistrationPage, RegistrationStore, StoreError};

const SEARCH_FILTER: &str = "($1::text IS NULL
    OR first_name ILIKE $1
    OR last_name ILIKE $1
    OR username ILIKE $1
    OR email ILIKE $1)";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turn a unique violation into a `Conflict` naming the offending field
fn map_unique_violation(err: sqlx::Error, candidates: &[(&str, &'static str, &str)]) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if let Some((_, field, value)) = candidates
                .iter()
                .find(|(name, _, _)| *name == constraint)
            {
                return StoreError::Conflict {
                    field: *field,
                    value: value.to_string(),
                };
            }
        }
    }
    error!(error = ?err, "database write failed");
    StoreError::Database(err)
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

#[async_trait]
impl RegistrationStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, RegistrationRecord>(
            r#"
            INSERT INTO users (
                first_name, last_name, username, email, mobile, dob, age, gender,
                address, postal_code, country, state, city, education, profile_photo,
                security_question, security_answer, password_hash,
                guardian_name, guardian_email, guardian_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            RETURNING *
            "#,
        )
        .bind(&registration.first_name)
        .bind(&registration.last_name)
        .bind(&registration.username)
        .bind(&registration.email)
        .bind(&registration.mobile)
        .bind(registration.dob)
        .bind(registration.age)
        .bind(&registration.gender)
        .bind(&registration.address)
        .bind(&registration.postal_code)
        .bind(&registration.country)
        .bind(&registration.state)
        .bind(&registration.city)
        .bind(&registration.education)
        .bind(&registration.profile_photo)
        .bind(&registration.security_question)
        .bind(&registration.security_answer)
        .bind(&registration.password_hash)
        .bind(&registration.guardian_name)
        .bind(&registration.guardian_email)
        .bind(&registration.guardian_phone)
        .fetch_one(&mut *tx)
        .await;

        // Dropping the transaction on the error path rolls it back
        let record = inserted.map_err(|err| {
            map_unique_violation(
                err,
                &[
                    ("users_username_key", "username", registration.username.as_str()),
                    ("users_email_key", "email", registration.email.as_str()),
                ],
            )
        })?;

        tx.commit().await?;
        debug!(id = record.id, "registration row committed");
        Ok(record)
    }

    async fn get_registration(&self, id: i64) -> Result<Option<RegistrationRecord>, StoreError> {
        let record = sqlx::query_as::<_, RegistrationRecord>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn search_registrations(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<RegistrationPage, StoreError> {
        let pattern = like_pattern(search);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM users WHERE {SEARCH_FILTER}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, RegistrationRecord>(&format!(
            "SELECT * FROM users WHERE {SEARCH_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(per_page)
        .bind(page_offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok(RegistrationPage { records, total })
    }

    async fn all_registrations(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let records = sqlx::query_as::<_, RegistrationRecord>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn delete_registration(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminPrincipal>, StoreError> {
        let admin = sqlx::query_as::<_, AdminPrincipal>(
            "SELECT * FROM admins WHERE admin_username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminPrincipal, StoreError> {
        sqlx::query_as::<_, AdminPrincipal>(
            r#"
            INSERT INTO admins (admin_username, admin_email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&admin.admin_username)
        .bind(&admin.admin_email)
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            map_unique_violation(
                err,
                &[
                    ("admins_username_key", "admin_username", admin.admin_username.as_str()),
                    ("admins_email_key", "admin_email", admin.admin_email.as_str()),
                ],
            )
        })
    }

    async fn record_admin_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE admins SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("ali")).as_deref(), Some("%ali%"));
        assert_eq!(like_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }
}
