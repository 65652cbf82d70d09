use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "papaya.toml",
    "config/papaya.toml",
    "../papaya.toml",
    "../config/papaya.toml",
];

/// Secret used when nothing else is configured. Fine for local development only.
pub const DEFAULT_JWT_SECRET: &str = "not_so_secret";

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.http.address.trim().is_empty() {
            bail!("http.address must not be empty");
        }
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret must not be empty");
        }
        if self.auth.token_ttl_seconds == 0 {
            bail!("auth.token_ttl_seconds must be greater than zero");
        }
        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            bail!("auth.token_ttl_seconds must be at most {MAX_TOKEN_TTL_SECONDS}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://papaya.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Token signing settings.
///
/// ```
/// use papaya_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.token_ttl_seconds, 3_600);
/// assert!(auth.uses_default_secret());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl AuthConfig {
    fn default_secret() -> String {
        DEFAULT_JWT_SECRET.to_string()
    }

    const fn default_token_ttl() -> u64 {
        3_600
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_secret(),
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

// The secret must never end up in logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// Precedence, lowest first: built-in defaults, the config file, `PAPAYA__*`
/// variables, then the bare `PORT`, `JWT_SECRET` and `DATABASE_URL` variables.
///
/// ```
/// use papaya_config::load;
///
/// std::env::remove_var("PAPAYA_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let token_ttl = i64::try_from(defaults.auth.token_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())?
        .set_default("auth.token_ttl_seconds", token_ttl)?;

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PAPAYA_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PAPAYA_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("PAPAYA").separator("__"));

    let port = match std::env::var("PORT") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
        ),
        Err(_) => None,
    };

    builder = builder
        .set_override_option("http.port", port.map(i64::from))?
        .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate()?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.auth.token_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_token_ttl() {
        let mut config = AppConfig::default();
        config.auth.token_ttl_seconds = MAX_TOKEN_TTL_SECONDS;
        assert!(config.validate().is_ok());

        for ttl in [MAX_TOKEN_TTL_SECONDS + 1, i64::MAX as u64, u64::MAX] {
            config.auth.token_ttl_seconds = ttl;
            assert!(config.validate().is_err(), "ttl {ttl} should be rejected");
        }
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn auth_debug_output_hides_secret() {
        let auth = AuthConfig {
            jwt_secret: "super-secret-value".to_string(),
            token_ttl_seconds: 60,
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
