//! Note entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub starred: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
}
