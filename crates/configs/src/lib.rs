//! # configs
//!
//! Layered application configuration: built-in defaults, then an optional
//! `config/wayfarer.toml`, then `WAYFARER__*` environment variables (a
//! `.env` file is honored in development). Secrets stay wrapped in
//! `secrecy` so they never land in debug output.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection string.
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
}

/// The remote media host (Cloudinary-style REST surface).
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub base_url: String,
    pub api_key: SecretString,
    /// Folder prefix for everything this deployment uploads.
    pub folder: String,
}

/// The transactional email provider's HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Loads defaults < file < environment. Call once at process start.
    pub fn load() -> Result<Self, ConfigError> {
        // .env is a development convenience; absence is not an error.
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.uri", "mongodb://localhost:27017")?
            .set_default("database.name", "wayfarer")?
            .set_default("media.folder", "wayfarer")?
            .add_source(File::with_name("config/wayfarer").required(false))
            .add_source(Environment::with_prefix("WAYFARER").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9090,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:9090");
    }
}
