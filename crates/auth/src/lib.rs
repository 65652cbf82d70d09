pub mod password;
pub mod token;
pub mod validation;

use papaya_config::AuthConfig;
use papaya_database::{StoreError, User, UserRepository};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

pub use token::{Claims, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("token could not be issued")]
    TokenCreation,
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A user together with a freshly issued token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenService::from_config(config),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        validation::validate_email(email)?;
        validation::validate_password(password)?;

        if self.users.email_exists(email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password::hash_password(password)?;

        // A concurrent registration can still win the race; the UNIQUE
        // constraint reports it as a conflict.
        let user = self
            .users
            .create(email, &password_hash)
            .await
            .map_err(email_conflict)?;

        info!(user_id = user.id, "registered user");
        self.start_session(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let record = self
            .users
            .find_record_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(password, &record.password_hash)? {
            debug!(user_id = record.id, "password mismatch on login");
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(record.into_user())
    }

    pub async fn update_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let record = self
            .users
            .find_record_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(current_password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        validation::validate_password(new_password)?;
        let password_hash = password::hash_password(new_password)?;

        if !self.users.update_password(user_id, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id, "password updated");
        Ok(())
    }

    pub async fn profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update_profile(&self, user_id: i64, email: &str) -> Result<User, AuthError> {
        validation::validate_email(email)?;

        let user = self
            .users
            .update_email(user_id, email)
            .await
            .map_err(email_conflict)?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id, "profile updated");
        Ok(user)
    }

    /// Resolve a bearer token to the user id it was issued for
    pub fn authenticate_token(&self, token: &str) -> Result<i64, AuthError> {
        self.tokens.verify(token)
    }

    fn start_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }
}

fn email_conflict(err: StoreError) -> AuthError {
    if err.is_conflict() {
        AuthError::EmailTaken
    } else {
        AuthError::Store(err)
    }
}
