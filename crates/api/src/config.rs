use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Session token configuration
    pub auth: AuthConfig,
    /// Primary/secondary store configuration
    pub stores: StoresConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for signing session tokens
    pub token_secret: String,

    /// Session token expiration in seconds (default: 28800 = 8 hours,
    /// one portal working day)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

/// The two row-store backends plus the dual-sync switch.
#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    pub primary: StoreConfig,

    #[serde(default)]
    pub secondary: StoreConfig,

    /// Whether user writes are mirrored to the secondary store.
    #[serde(default)]
    pub dual_sync: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// REST root of the store, e.g. `https://xyz.example.co/rest/v1`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_token_expiry() -> i64 {
    28800
}
fn default_leeway() -> u64 {
    30
}
fn default_store_timeout() -> u64 {
    10
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with AP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("AP").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a configuration from defaults and overrides, without touching
    /// the file system. Used by tests.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [auth]
            token_secret = "test-secret-not-for-production"
            token_expiry_secs = 28800
            leeway_secs = 30

            [stores]
            dual_sync = true

            [stores.primary]
            url = "http://primary.test/rest/v1"
            api_key = "primary-test-key"
            timeout_secs = 10

            [stores.secondary]
            url = "http://secondary.test/rest/v1"
            api_key = "secondary-test-key"
            timeout_secs = 10
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.stores.primary.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "AP__STORES__PRIMARY__URL environment variable must be set".to_string(),
            ));
        }

        if self.stores.dual_sync && self.stores.secondary.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "AP__STORES__SECONDARY__URL must be set when dual_sync is enabled".to_string(),
            ));
        }

        if self.auth.token_secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "AP__AUTH__TOKEN_SECRET environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}
