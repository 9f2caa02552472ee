//! Server configuration: TOML file plus environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    pub base_domain: Option<String>,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub storage_root: PathBuf,
    pub storage_region: String,
    pub base_domain: String,
    pub dev_mode: bool,
}

impl Config {
    /// Loads configuration from `STOREFORGE_CONFIG` (or the given path) and
    /// applies environment overrides. `DATABASE_URL` is the only value with
    /// no default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("STOREFORGE_CONFIG").map(Into::into))
        {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).with_context(|| {
                    format!("failed to read config file {}", path.display())
                })?;
                toml::from_str::<FileConfig>(&raw).with_context(|| {
                    format!("failed to parse config file {}", path.display())
                })?
            }
            None => FileConfig::default(),
        };

        let database_url = env_override("DATABASE_URL")
            .or(file.database.url)
            .context("DATABASE_URL is not set and no database.url in config")?;

        // Reject obviously malformed URLs before the pool does.
        url::Url::parse(&database_url).context("invalid PostgreSQL URL")?;

        Ok(Self {
            host: env_override("SERVER_HOST")
                .or(file.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_override("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .or(file.server.port)
                .unwrap_or(4000),
            database_url,
            max_connections: env_override("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .or(file.database.max_connections)
                .unwrap_or(10),
            storage_root: env_override("STORAGE_ROOT")
                .map(PathBuf::from)
                .or(file.storage.root)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            storage_region: env_override("STORAGE_REGION")
                .or(file.storage.region)
                .unwrap_or_else(|| "local".to_string()),
            base_domain: env_override("BASE_DOMAIN")
                .or(file.base_domain)
                .unwrap_or_else(|| "localhost".to_string()),
            dev_mode: env_override("DEV_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(file.dev_mode)
                .unwrap_or(false),
        })
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
