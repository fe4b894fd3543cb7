use std::env;
use std::fmt;

use auth::HashingCost;
use auth::TokenCodec;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: HashingCost,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    /// Raw signing secret, used as bytes.
    pub secret: String,
    /// Token lifetime in milliseconds.
    #[serde(default = "default_expiration_ms")]
    pub expiration_ms: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expiration_ms", &self.expiration_ms)
            .finish()
    }
}

impl JwtConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.expiration_ms)
    }
}

/// Longest accepted token lifetime: 365 days.
pub const MAX_EXPIRATION_MS: i64 = 365 * 24 * 60 * 60 * 1000;

fn default_max_connections() -> u32 {
    5
}

fn default_expiration_ms() -> i64 {
    7_200_000
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// # Errors
    /// Missing or malformed values, a secret shorter than 32 bytes or a token
    /// lifetime outside `1..=MAX_EXPIRATION_MS`.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < TokenCodec::MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                TokenCodec::MIN_SECRET_LEN,
                self.jwt.secret.len()
            )));
        }
        if self.jwt.expiration_ms <= 0 || self.jwt.expiration_ms > MAX_EXPIRATION_MS {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_ms must be between 1 and {}, got {}",
                MAX_EXPIRATION_MS, self.jwt.expiration_ms
            )));
        }
        Ok(())
    }
}
