use std::env;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/eventy";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SERVER_PORT: u16 = 3001;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(String),

    #[error("invalid value for {key}: {details}")]
    Invalid { key: String, details: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

/// Key material used to check bearer token signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtKey {
    /// HS256 shared secret.
    Secret(String),
    /// RS256 public key in PEM form, as published by the identity provider.
    RsaPublicKeyPem(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    pub key: JwtKey,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub store_backend: StoreBackend,
    pub server_port: u16,
    pub jwt: JwtSettings,
    pub enforce_date_order: bool,
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_key = match (lookup("JWT_PUBLIC_KEY_PEM"), lookup("JWT_SECRET")) {
            (Some(pem), _) if !pem.trim().is_empty() => JwtKey::RsaPublicKeyPem(pem),
            (_, Some(secret)) if secret.len() >= 32 => JwtKey::Secret(secret),
            (_, Some(secret)) => {
                return Err(ConfigError::Invalid {
                    key: "JWT_SECRET".to_string(),
                    details: format!("must be at least 32 characters (got {})", secret.len()),
                })
            }
            (_, None) => {
                return Err(ConfigError::Missing(
                    "JWT_SECRET or JWT_PUBLIC_KEY_PEM".to_string(),
                ))
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            store_backend: parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?,
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            jwt: JwtSettings {
                key: jwt_key,
                issuer: lookup("JWT_ISSUER").filter(|v| !v.trim().is_empty()),
            },
            enforce_date_order: parse_or(&lookup, "EVENT_ENFORCE_DATE_ORDER", false)?,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            details: e.to_string(),
        }),
        None => Ok(default),
    }
}
