use papaya_auth::Authenticator;
use papaya_config::AuthConfig;
use papaya_database::SqlitePool;
use papaya_notes::NoteService;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    notes: NoteService,
}

impl AppState {
    pub fn new(authenticator: Authenticator, notes: NoteService) -> Self {
        Self {
            authenticator,
            notes,
        }
    }

    pub fn from_pool(pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self::new(Authenticator::new(pool.clone(), auth), NoteService::new(pool))
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn notes(&self) -> &NoteService {
        &self.notes
    }

    pub fn authenticate(&self, token: &str) -> Result<i64, ApiError> {
        self.authenticator
            .authenticate_token(token)
            .map_err(ApiError::from)
    }
}
