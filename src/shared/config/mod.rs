//! Application configuration module
//!
//! `AppConfig` gathers every setting the server reads at startup. It is built
//! either programmatically through `AppConfigBuilder` (tests) or from the
//! process environment (`AppConfig::from_env`, used by the binary).

use std::time::Duration;
use thiserror::Error;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);
/// Default per-connection outbound queue length
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;
/// Default largest accepted inbound frame
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;
/// Default wait for room in a full outbound queue
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);
/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Secret used to sign identity tokens
    pub jwt_secret: String,
    /// Raw content cipher key as configured (raw 32 bytes or 64 hex chars)
    pub encryption_key: Option<String>,
    /// Lifetime of issued identity tokens
    pub token_ttl: Duration,
    /// Listening port
    pub port: u16,
    /// PostgreSQL URL; in-memory collaborators are used when absent
    pub database_url: Option<String>,
    /// Per-connection outbound queue length
    pub outbound_capacity: usize,
    /// Largest accepted inbound real-time frame, in bytes
    pub max_frame_bytes: usize,
    /// How long the router waits on one full outbound queue before dropping the session
    pub delivery_timeout: Duration,
    /// Require a verified token on real-time connections
    pub ws_require_token: bool,
    /// Extra CORS origins besides browser extensions
    pub allowed_origins: Vec<String>,
    /// `(username, password)` accounts created in the in-memory credential store
    pub seed_users: Vec<(String, String)>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("outbound_capacity", &self.outbound_capacity)
            .field("max_frame_bytes", &self.max_frame_bytes)
            .field("delivery_timeout", &self.delivery_timeout)
            .field("ws_require_token", &self.ws_require_token)
            .field("allowed_origins", &self.allowed_origins)
            .field(
                "seed_users",
                &self.seed_users.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(key) = get("ENCRYPTION_KEY") {
            builder = builder.encryption_key(key);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(port) = get("SERVER_PORT") {
            builder = builder.port(parse_var("SERVER_PORT", &port)?);
        }
        if let Some(hours) = get("TOKEN_TTL_HOURS") {
            let secs = parse_var::<u64>("TOKEN_TTL_HOURS", &hours)?
                .checked_mul(60 * 60)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "TOKEN_TTL_HOURS",
                    value: hours.clone(),
                })?;
            builder = builder.token_ttl(Duration::from_secs(secs));
        }
        if let Some(capacity) = get("WS_OUTBOUND_CAPACITY") {
            builder = builder.outbound_capacity(parse_var("WS_OUTBOUND_CAPACITY", &capacity)?);
        }
        if let Some(bytes) = get("WS_MAX_FRAME_BYTES") {
            builder = builder.max_frame_bytes(parse_var("WS_MAX_FRAME_BYTES", &bytes)?);
        }
        if let Some(millis) = get("WS_DELIVERY_TIMEOUT_MS") {
            let millis: u64 = parse_var("WS_DELIVERY_TIMEOUT_MS", &millis)?;
            builder = builder.delivery_timeout(Duration::from_millis(millis));
        }
        if let Some(flag) = get("WS_REQUIRE_TOKEN") {
            builder = builder.ws_require_token(parse_flag("WS_REQUIRE_TOKEN", &flag)?);
        }
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            builder = builder.allowed_origins(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        if let Some(users) = get("SEED_USERS") {
            builder = builder.seed_users(parse_seed_users(&users)?);
        }
        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.outbound_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "WS_OUTBOUND_CAPACITY",
                value: "0".to_string(),
            });
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "WS_MAX_FRAME_BYTES",
                value: "0".to_string(),
            });
        }
        if self.token_ttl.is_zero() || self.token_ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::InvalidValue {
                name: "TOKEN_TTL_HOURS",
                value: format!("{}h", self.token_ttl.as_secs() / 3600),
            });
        }
        if self.delivery_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "WS_DELIVERY_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Parse `user:password,user:password`
fn parse_seed_users(value: &str) -> Result<Vec<(String, String)>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, password)) if !name.trim().is_empty() && !password.is_empty() => {
                Ok((name.trim().to_string(), password.to_string()))
            }
            _ => Err(ConfigError::InvalidValue {
                name: "SEED_USERS",
                value: entry.split(':').next().unwrap_or_default().to_string(),
            }),
        })
        .collect()
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    jwt_secret: Option<String>,
    encryption_key: Option<String>,
    token_ttl: Option<Duration>,
    port: Option<u16>,
    database_url: Option<String>,
    outbound_capacity: Option<usize>,
    max_frame_bytes: Option<usize>,
    delivery_timeout: Option<Duration>,
    ws_require_token: bool,
    allowed_origins: Vec<String>,
    seed_users: Vec<(String, String)>,
}

impl AppConfigBuilder {
    /// Set the token signing secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Set the content cipher key
    pub fn encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = Some(capacity);
        self
    }

    pub fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.max_frame_bytes = Some(bytes);
        self
    }

    pub fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = Some(timeout);
        self
    }

    pub fn ws_require_token(mut self, required: bool) -> Self {
        self.ws_require_token = required;
        self
    }

    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn seed_users(mut self, users: Vec<(String, String)>) -> Self {
        self.seed_users = users;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            encryption_key: self.encryption_key,
            token_ttl: self.token_ttl.unwrap_or(DEFAULT_TOKEN_TTL),
            port: self.port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            outbound_capacity: self.outbound_capacity.unwrap_or(DEFAULT_OUTBOUND_CAPACITY),
            max_frame_bytes: self.max_frame_bytes.unwrap_or(DEFAULT_MAX_FRAME_BYTES),
            delivery_timeout: self.delivery_timeout.unwrap_or(DEFAULT_DELIVERY_TIMEOUT),
            ws_require_token: self.ws_require_token,
            allowed_origins: self.allowed_origins,
            seed_users: self.seed_users,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}
