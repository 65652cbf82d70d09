use anyhow::Result;
use papaya_auth::Authenticator;
use papaya_config::AppConfig;
use papaya_database::{initialize_database, DatabaseConnection};
use papaya_notes::NoteService;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything a running server needs, built from one `AppConfig`.
///
/// The store handle is opened here and must be released with
/// [`BackendServices::shutdown`] once the server has stopped.
#[derive(Clone)]
pub struct BackendServices {
    pub db: DatabaseConnection,
    pub authenticator: Authenticator,
    pub notes: NoteService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db = initialize_database(&config.database).await?;

        if config.auth.uses_default_secret() {
            warn!("auth.jwt_secret is the built-in default; set JWT_SECRET in production");
        }

        let authenticator = Authenticator::new(db.pool().clone(), &config.auth);
        let notes = NoteService::new(db.pool().clone());

        info!(url = %config.database.url, "backend services ready");

        Ok(Self {
            db,
            authenticator,
            notes,
        })
    }

    pub async fn shutdown(self) {
        self.db.close().await;
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
