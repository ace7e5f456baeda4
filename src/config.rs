// Runtime configuration
// Values come from the process environment (optionally seeded from a .env file)

use thiserror::Error;

use crate::auth::token::DEFAULT_TOKEN_TTL_SECONDS;

/// Secret used when running in development without JWT_SECRET
const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-in-production";

/// Origins the browser client is served from by default
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Hosting domains whose subdomains are always accepted as origins
pub const HOSTED_ORIGIN_SUFFIXES: [&str; 3] = [".web.app", ".firebaseapp.com", ".cloudfunctions.net"];

/// True when `origin` is in the allow-list or is an http(s) origin on a hosted subdomain
pub fn is_allowed_origin(origin: &str, allowed: &[String]) -> bool {
    if allowed.iter().any(|known| known == origin) {
        return true;
    }

    let host = match origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
    {
        Some(host) => host,
        None => return false,
    };

    HOSTED_ORIGIN_SUFFIXES.iter().any(|suffix| {
        host.strip_suffix(suffix)
            .is_some_and(|sub| !sub.is_empty() && !sub.contains('/'))
    })
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be set when APP_ENV is '{environment}'")]
    Missing {
        name: &'static str,
        environment: String,
    },
    #[error("{name} has an invalid value: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub allowed_origins: Vec<String>,
    pub environment: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let environment = var("APP_ENV").unwrap_or_else(|| "development".to_string());

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "development" || environment == "test" => {
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            None => {
                return Err(ConfigError::Missing {
                    name: "JWT_SECRET",
                    environment,
                })
            }
        };

        let port = parse_or("PORT", var("PORT"), 8080u16)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 5u32)?;
        let jwt_ttl_seconds = parse_or("JWT_TTL_SECONDS", var("JWT_TTL_SECONDS"), DEFAULT_TOKEN_TTL_SECONDS)?;
        if jwt_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_SECONDS",
                value: jwt_ttl_seconds.to_string(),
            });
        }

        let mut allowed_origins: Vec<String> =
            DEFAULT_ALLOWED_ORIGINS.iter().map(|origin| origin.to_string()).collect();
        if let Some(client_urls) = var("CLIENT_URL") {
            for origin in client_urls.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !allowed_origins.iter().any(|known| known == origin) {
                    allowed_origins.push(origin.to_string());
                }
            }
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            allowed_origins,
            environment,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
