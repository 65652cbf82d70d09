//! Share grant repository.

use crate::entities::SharedNote;
use crate::types::StoreResult;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[derive(Clone)]
pub struct ShareRepository {
    pool: SqlitePool,
}

impl ShareRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Grant `user_id` read access to `note_id`. Granting twice returns the
    /// existing grant.
    pub async fn create(&self, note_id: i64, user_id: i64) -> StoreResult<SharedNote> {
        sqlx::query(
            "INSERT INTO shared_notes (note_id, user_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (note_id, user_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, note_id, user_id, created_at FROM shared_notes WHERE note_id = ? AND user_id = ?",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_share(&row))
    }

    pub async fn is_shared_with(&self, note_id: i64, user_id: i64) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shared_notes WHERE note_id = ? AND user_id = ?",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn list_for_note(&self, note_id: i64) -> StoreResult<Vec<SharedNote>> {
        let rows = sqlx::query(
            "SELECT id, note_id, user_id, created_at FROM shared_notes WHERE note_id = ? ORDER BY id",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_share).collect())
    }
}

fn map_share(row: &SqliteRow) -> SharedNote {
    SharedNote {
        id: row.get("id"),
        note_id: row.get("note_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}
