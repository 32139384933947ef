use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Read the whole configuration from the process environment once at
    /// startup. A missing or malformed `API_PORT` falls back to the default.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(6),
        };
        Ok(Self {
            port,
            database_url,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns all the env mutation so parallel tests never race on it.
    // DATABASE_URL is left alone when already present: the store tests read
    // it concurrently.
    #[test]
    fn from_env_fallbacks() {
        if std::env::var("DATABASE_URL").is_err() {
            std::env::set_var("DATABASE_URL", "postgres://localhost/app");
        }
        std::env::set_var("JWT_SECRET", "dev-secret");

        std::env::set_var("API_PORT", "not-a-port");
        std::env::set_var("JWT_TTL_HOURS", "-5");
        let config = AppConfig::from_env().expect("config");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.jwt.ttl_hours, 6);

        std::env::set_var("JWT_TTL_HOURS", "0");
        assert_eq!(AppConfig::from_env().expect("config").jwt.ttl_hours, 6);

        std::env::set_var("API_PORT", "8080");
        std::env::set_var("JWT_TTL_HOURS", "12");
        let config = AppConfig::from_env().expect("config");
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt.ttl_hours, 12);

        std::env::remove_var("API_PORT");
        std::env::remove_var("JWT_TTL_HOURS");
    }
}
