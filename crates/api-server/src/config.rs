//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
const DEFAULT_DATA_DIR: &str = ".crm-data";
pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
/// Ten years; keeps token expiry well inside chrono's date range.
const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_SMTP_PORT: u16 = 465;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub media_dir: PathBuf,
    pub media_base_url: String,
    pub smtp: Option<SmtpConfig>,
    pub admin: Option<AdminBootstrap>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = match (get("CRM_BIND_ADDR"), get("PORT")) {
            (Some(addr), _) => parse("CRM_BIND_ADDR", &addr)?,
            (None, Some(port)) => {
                let port: u16 = parse("PORT", &port)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => parse("CRM_BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let data_dir = PathBuf::from(get("CRM_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let media_dir = get("CRM_MEDIA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("uploads"));

        let token_ttl_seconds = match get("CRM_TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let ttl: i64 = parse("CRM_TOKEN_TTL_SECONDS", &raw)?;
                if ttl <= 0 || ttl > MAX_TOKEN_TTL_SECONDS {
                    return Err(ConfigError::Invalid {
                        name: "CRM_TOKEN_TTL_SECONDS",
                        value: raw,
                    });
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: match get("SMTP_PORT") {
                    Some(raw) => parse("SMTP_PORT", &raw)?,
                    None => DEFAULT_SMTP_PORT,
                },
                user: get("SMTP_USER").unwrap_or_default(),
                password: get("SMTP_PASS").unwrap_or_default(),
                from_name: get("SMTP_FROM_NAME").unwrap_or_else(|| "CRM".to_string()),
            }),
            None => None,
        };

        let admin = match (get("CRM_ADMIN_EMAIL"), get("CRM_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password,
                name: get("CRM_ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            data_dir,
            jwt_secret: get("CRM_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            token_ttl_seconds,
            media_dir,
            media_base_url: get("CRM_MEDIA_BASE_URL").unwrap_or_else(|| "/uploads".to_string()),
            smtp,
            admin,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
