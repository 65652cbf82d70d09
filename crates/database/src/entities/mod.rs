//! Domain entities for the database layer

pub mod note;
pub mod shared_note;
pub mod user;

pub use note::{CreateNoteRequest, Note, UpdateNoteRequest};
pub use shared_note::SharedNote;
pub use user::{User, UserRecord};
