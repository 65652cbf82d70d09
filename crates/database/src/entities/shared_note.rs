//! Share grant entity

use serde::{Deserialize, Serialize};

/// Read access to `note_id` granted to `user_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedNote {
    pub id: i64,
    pub note_id: i64,
    pub user_id: i64,
    pub created_at: String,
}
