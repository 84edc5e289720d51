use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;

const DEV_TOKEN_SECRET: &str = "jobboard-development-secret-do-not-use-in-production";
const MIN_TOKEN_SECRET_LEN: usize = 32;
const MIN_PASSWORD_ITERATIONS: u32 = 1_000;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        let auth = AuthConfig::from_env(environment)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            auth,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output shape of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Credential signing and password hashing parameters.
#[derive(Clone)]
pub struct AuthConfig {
    pub token_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub password_iterations: u32,
}

impl AuthConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let token_secret = match env::var("APP_TOKEN_SECRET") {
            Ok(secret) if secret.len() >= MIN_TOKEN_SECRET_LEN => secret.into_bytes(),
            Ok(_) => return Err(ConfigError::WeakTokenSecret),
            Err(_) if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingTokenSecret)
            }
            Err(_) => {
                tracing::warn!("APP_TOKEN_SECRET unset, using the development signing key");
                DEV_TOKEN_SECRET.as_bytes().to_vec()
            }
        };

        let ttl_hours = env::var("APP_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .ok()
            .filter(|hours| *hours > 0)
            .ok_or(ConfigError::InvalidTokenTtl)?;

        let password_iterations = env::var("APP_PASSWORD_ITERATIONS")
            .unwrap_or_else(|_| DEFAULT_PASSWORD_ITERATIONS.to_string())
            .parse::<u32>()
            .ok()
            .filter(|rounds| *rounds >= MIN_PASSWORD_ITERATIONS)
            .ok_or(ConfigError::InvalidPasswordIterations)?;

        Ok(Self {
            token_secret,
            token_ttl: Duration::hours(ttl_hours),
            password_iterations,
        })
    }

    /// Configuration suited to tests and demos: fixed key, cheap hashing.
    pub fn ephemeral() -> Self {
        Self {
            token_secret: DEV_TOKEN_SECRET.as_bytes().to_vec(),
            token_ttl: Duration::hours(24),
            password_iterations: MIN_PASSWORD_ITERATIONS,
        }
    }
}

// Keeps the signing key out of debug output.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    MissingTokenSecret,
    WeakTokenSecret,
    InvalidTokenTtl,
    InvalidPasswordIterations,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::MissingTokenSecret => {
                write!(f, "APP_TOKEN_SECRET is required in production")
            }
            ConfigError::WeakTokenSecret => write!(
                f,
                "APP_TOKEN_SECRET must be at least {MIN_TOKEN_SECRET_LEN} bytes"
            ),
            ConfigError::InvalidTokenTtl => {
                write!(f, "APP_TOKEN_TTL_HOURS must be a positive integer")
            }
            ConfigError::InvalidPasswordIterations => write!(
                f,
                "APP_PASSWORD_ITERATIONS must be an integer >= {MIN_PASSWORD_ITERATIONS}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
