//! User repository for database operations.

use crate::entities::{User, UserRecord};
use crate::types::StoreResult;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A taken email surfaces as `StoreError::Conflict`.
    pub async fn create(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(&format!(
            "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_record(&row).into_user())
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.find_record_by_id(id).await?.map(UserRecord::into_user))
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .find_record_by_email(email)
            .await?
            .map(UserRecord::into_user))
    }

    pub async fn find_record_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_record))
    }

    pub async fn find_record_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_record))
    }

    /// Check if email exists
    pub async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Replace the stored hash. Returns false when the user does not exist.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change the account email. A taken email surfaces as `StoreError::Conflict`.
    pub async fn update_email(&self, id: i64, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET email = ?, updated_at = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| map_record(row).into_user()))
    }

    /// All accounts, oldest first
    pub async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| map_record(row).into_user()).collect())
    }
}

fn map_record(row: &SqliteRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
