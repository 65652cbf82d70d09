//! Note repository for database operations.
//!
//! Every mutating query is scoped by `owner_id` so ownership is checked in
//! the same statement that writes. A `None`/`false` result means "no row
//! matched"; callers decide whether that was a missing note or a foreign one.

use crate::entities::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::types::StoreResult;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const NOTE_COLUMNS: &str = "id, owner_id, title, content, starred, created_at, updated_at";

/// Repository for note database operations
#[derive(Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    /// Create a new note repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a note owned by `owner_id`, unstarred
    pub async fn create(&self, owner_id: i64, request: &CreateNoteRequest) -> StoreResult<Note> {
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(&format!(
            "INSERT INTO notes (owner_id, title, content, starred, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_note(&row))
    }

    /// Find note by ID, regardless of owner
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_note))
    }

    /// Notes owned by the user plus notes shared with them, oldest first
    pub async fn list_visible_to(&self, user_id: i64) -> StoreResult<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ? \
             UNION \
             SELECT n.id, n.owner_id, n.title, n.content, n.starred, n.created_at, n.updated_at \
             FROM notes n INNER JOIN shared_notes s ON s.note_id = n.id WHERE s.user_id = ? \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_note).collect())
    }

    /// Notes owned by `owner_id`, oldest first
    pub async fn list_owned(&self, owner_id: i64) -> StoreResult<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ? ORDER BY created_at ASC, id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_note).collect())
    }

    /// Replace title and content if `owner_id` owns the note
    pub async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        request: &UpdateNoteRequest,
    ) -> StoreResult<Option<Note>> {
        let row = sqlx::query(&format!(
            "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ? AND owner_id = ? RETURNING {NOTE_COLUMNS}"
        ))
        .bind(&request.title)
        .bind(&request.content)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_note))
    }

    /// Flip the starred flag if `owner_id` owns the note
    pub async fn toggle_star_owned(&self, id: i64, owner_id: i64) -> StoreResult<Option<Note>> {
        let row = sqlx::query(&format!(
            "UPDATE notes SET starred = NOT starred, updated_at = ? WHERE id = ? AND owner_id = ? RETURNING {NOTE_COLUMNS}"
        ))
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_note))
    }

    /// Delete the note and its share grants if `owner_id` owns it
    pub async fn delete_owned(&self, id: i64, owner_id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM shared_notes WHERE note_id IN (SELECT id FROM notes WHERE id = ? AND owner_id = ?)",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Every note in the store, oldest first
    pub async fn list_all(&self) -> StoreResult<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_note).collect())
    }
}

fn map_note(row: &SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        content: row.get("content"),
        starred: row.get("starred"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
