//! Papaya Database Crate
//!
//! This crate owns the SQLite store for the Papaya backend: connection
//! management, migrations, and the user, note and share repositories.

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use repos::{NoteRepository, ShareRepository, UserRepository};

pub use entities::{
    note::{CreateNoteRequest, Note, UpdateNoteRequest},
    shared_note::SharedNote,
    user::{User, UserRecord},
};

pub use types::{
    errors::{DatabaseError, StoreError},
    DatabaseResult, StoreResult,
};

pub use papaya_config::DatabaseConfig;
pub use sqlx::SqlitePool;

/// Open the store described by `config` and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<DatabaseConnection> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(DatabaseConnection::from_pool(pool))
}
