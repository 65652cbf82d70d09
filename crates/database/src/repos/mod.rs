//! Database repository implementations

pub mod note_repository;
pub mod share_repository;
pub mod user_repository;

pub use note_repository::NoteRepository;
pub use share_repository::ShareRepository;
pub use user_repository::UserRepository;
