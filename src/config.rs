/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, VALKEY_URL, token 鍵, timeout, CORS など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;

use crate::middleware::pipeline::UnparseablePolicy;
use crate::services::auth::TokenKeys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub valkey_url: Option<String>,
    pub revocation_key_prefix: String,

    pub session_header: HeaderName,
    pub token_keys: TokenKeys,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,

    pub revocation_lookup_timeout: Duration,
    pub ownership_lookup_timeout: Duration,
    pub ownership_unparseable_policy: UnparseablePolicy,

    pub route_rules_path: Option<String>,
}

fn pem_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.replace("\\n", "\n"))
}

fn millis_var(key: &str, default: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(ms)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(
            std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        // In-memory revocation is per process; production must share state.
        let valkey_url = std::env::var("VALKEY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if valkey_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("VALKEY_URL"));
        }

        let revocation_key_prefix = std::env::var("REVOCATION_KEY_PREFIX")
            .unwrap_or_else(|_| "session:revoked".to_string());

        let session_header = std::env::var("SESSION_HEADER")
            .unwrap_or_else(|_| "authorization".to_string())
            .to_ascii_lowercase()
            .parse::<HeaderName>()
            .map_err(|_| ConfigError::Invalid("SESSION_HEADER"))?;

        let token_keys = match (
            std::env::var("SESSION_JWT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            pem_var("SESSION_JWT_PUBLIC_KEY_PEM"),
        ) {
            (Some(_), Some(_)) => return Err(ConfigError::Invalid("SESSION_JWT_SECRET")),
            (Some(secret), None) => TokenKeys::Hmac {
                secret: secret.into_bytes(),
            },
            (None, Some(public_key_pem)) => TokenKeys::Ed25519 {
                public_key_pem,
                private_key_pem: pem_var("SESSION_JWT_PRIVATE_KEY_PEM"),
            },
            (None, None) => return Err(ConfigError::Missing("SESSION_JWT_SECRET")),
        };

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let revocation_lookup_timeout = millis_var("REVOCATION_LOOKUP_TIMEOUT_MS", 200);
        let ownership_lookup_timeout = millis_var("OWNERSHIP_LOOKUP_TIMEOUT_MS", 500);

        let ownership_unparseable_policy = match std::env::var("OWNERSHIP_UNPARSEABLE_POLICY") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("OWNERSHIP_UNPARSEABLE_POLICY"))?,
            Err(_) => UnparseablePolicy::default(),
        };

        let route_rules_path = std::env::var("ROUTE_RULES_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout,
            valkey_url,
            revocation_key_prefix,
            session_header,
            token_keys,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            revocation_lookup_timeout,
            ownership_lookup_timeout,
            ownership_unparseable_policy,
            route_rules_path,
        })
    }
}
