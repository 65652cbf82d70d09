//! Note service: ownership checks, the owned-plus-shared view, search,
//! starring and sharing.

use papaya_database::{
    CreateNoteRequest, Note, NoteRepository, ShareRepository, SharedNote, StoreError,
    UpdateNoteRequest, UserRepository,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

pub const MAX_TITLE_LENGTH: usize = 255;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note not found")]
    NotFound,
    #[error("note belongs to another user")]
    Forbidden,
    #[error("recipient not found")]
    RecipientNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type NoteResult<T> = Result<T, NoteError>;

#[derive(Clone)]
pub struct NoteService {
    notes: NoteRepository,
    shares: ShareRepository,
    users: UserRepository,
}

impl NoteService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            notes: NoteRepository::new(pool.clone()),
            shares: ShareRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    pub async fn create(&self, owner_id: i64, title: &str, content: &str) -> NoteResult<Note> {
        validate_title(title)?;

        let note = self
            .notes
            .create(
                owner_id,
                &CreateNoteRequest {
                    title: title.to_owned(),
                    content: content.to_owned(),
                },
            )
            .await?;

        info!(user_id = owner_id, note_id = note.id, "note created");
        Ok(note)
    }

    /// Notes owned by `user_id` and notes shared with them, each once
    pub async fn list_all(&self, user_id: i64) -> NoteResult<Vec<Note>> {
        Ok(self.notes.list_visible_to(user_id).await?)
    }

    /// A note readable by its owner or any share recipient
    pub async fn get(&self, note_id: i64, user_id: i64) -> NoteResult<Note> {
        let note = self
            .notes
            .find_by_id(note_id)
            .await?
            .ok_or(NoteError::NotFound)?;

        if note.owner_id == user_id || self.shares.is_shared_with(note_id, user_id).await? {
            Ok(note)
        } else {
            Err(NoteError::Forbidden)
        }
    }

    pub async fn update(
        &self,
        note_id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> NoteResult<Note> {
        validate_title(title)?;

        let request = UpdateNoteRequest {
            title: title.to_owned(),
            content: content.to_owned(),
        };

        match self.notes.update_owned(note_id, user_id, &request).await? {
            Some(note) => {
                info!(user_id, note_id, "note updated");
                Ok(note)
            }
            None => Err(self.classify_miss(note_id).await),
        }
    }

    pub async fn delete(&self, note_id: i64, user_id: i64) -> NoteResult<()> {
        if self.notes.delete_owned(note_id, user_id).await? {
            info!(user_id, note_id, "note deleted");
            Ok(())
        } else {
            Err(self.classify_miss(note_id).await)
        }
    }

    /// Owned notes whose title or content contains `query`, compared after
    /// Unicode lowercasing. Shared notes are not searched.
    pub async fn search(&self, user_id: i64, query: &str) -> NoteResult<Vec<Note>> {
        let needle = query.to_lowercase();
        let notes = self.notes.list_owned(user_id).await?;

        Ok(notes
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub async fn toggle_star(&self, note_id: i64, user_id: i64) -> NoteResult<Note> {
        match self.notes.toggle_star_owned(note_id, user_id).await? {
            Some(note) => {
                debug!(user_id, note_id, starred = note.starred, "note star toggled");
                Ok(note)
            }
            None => Err(self.classify_miss(note_id).await),
        }
    }

    /// Grant the user registered under `recipient_email` read access.
    /// Sharing again with the same recipient returns the existing grant.
    pub async fn share(
        &self,
        note_id: i64,
        user_id: i64,
        recipient_email: &str,
    ) -> NoteResult<SharedNote> {
        let note = self
            .notes
            .find_by_id(note_id)
            .await?
            .ok_or(NoteError::NotFound)?;

        if note.owner_id != user_id {
            return Err(NoteError::Forbidden);
        }

        let recipient = self
            .users
            .find_by_email(recipient_email)
            .await?
            .ok_or(NoteError::RecipientNotFound)?;

        if recipient.id == user_id {
            return Err(NoteError::Validation(
                "cannot share a note with yourself".to_string(),
            ));
        }

        let share = self.shares.create(note_id, recipient.id).await?;
        info!(user_id, note_id, recipient_id = recipient.id, "note shared");
        Ok(share)
    }

    /// An owner-scoped write touched no row: tell a missing note from a
    /// foreign one.
    async fn classify_miss(&self, note_id: i64) -> NoteError {
        match self.notes.find_by_id(note_id).await {
            Ok(Some(_)) => NoteError::Forbidden,
            Ok(None) => NoteError::NotFound,
            Err(err) => NoteError::Store(err),
        }
    }
}

fn validate_title(title: &str) -> NoteResult<()> {
    if title.trim().is_empty() {
        return Err(NoteError::Validation("title must not be empty".to_string()));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(NoteError::Validation(
            "title must be at most 255 characters long".to_string(),
        ));
    }

    Ok(())
}
