/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, ACCESS_TOKEN, CORS 許可, Payment 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

// keeps `iat + ttl` far inside the i64 range of JWT timestamps
const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    Memory,
}

impl StoreBackend {
    fn parse(database_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(database_url).map_err(|_| ConfigError::Invalid("DATABASE_URL"))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(Self::Postgres(database_url.to_string())),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("DATABASE_URL")),
        }
    }
}

#[derive(Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub api_base: Url,
    pub currency: String,
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret key
        f.debug_struct("PaymentConfig")
            .field("api_base", &self.api_base.as_str())
            .field("currency", &self.currency)
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub store: StoreBackend,
    pub database_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_seconds: u64,

    // HS256 shared secret; signs on upsert, verifies on every gated request
    pub access_token_secret: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub payment: Option<PaymentConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("payment", &self.payment)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` feeds it the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 5000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let store = StoreBackend::parse(&database_url)?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let access_token_secret = lookup("ACCESS_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN"))?;

        let access_token_ttl_seconds = match lookup("ACCESS_TOKEN_TTL_SECONDS") {
            None => 86_400, // 1 day
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| (1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(n))
                .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))?,
        };

        let access_token_leeway_seconds = lookup("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let payment = match lookup("PAYMENT_SECRET_KEY").filter(|s| !s.trim().is_empty()) {
            Some(secret_key) => {
                let api_base = lookup("PAYMENT_API_BASE")
                    .unwrap_or_else(|| "https://api.stripe.com".to_string());
                let api_base =
                    Url::parse(&api_base).map_err(|_| ConfigError::Invalid("PAYMENT_API_BASE"))?;
                let currency = lookup("PAYMENT_CURRENCY")
                    .map(|c| c.trim().to_ascii_lowercase())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "usd".to_string());

                Some(PaymentConfig {
                    secret_key,
                    api_base,
                    currency,
                })
            }
            None => None,
        };

        Ok(Self {
            addr,
            app_env,
            store,
            database_max_connections,
            cors_allowed_origins,
            request_timeout_seconds,
            access_token_secret,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            payment,
        })
    }
}
