use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::render::RenderConfig;
use crate::strategy::OfficeConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub renderer: RenderConfig,
    #[serde(default)]
    pub office: OfficeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used in download links. Defaults to
    /// `http://{host}:{port}`.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Base URL clients reach the service at.
    pub fn resolved_public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    50 * 1024 * 1024
}

/// Artifact storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory uploads and outputs live in.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Grace period before a consumed input artifact is deleted, in seconds.
    #[serde(default = "default_cleanup_grace")]
    pub cleanup_grace_secs: u64,
    /// Age after which any artifact is expired, in seconds.
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    /// Interval between expiry sweeps, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            cleanup_grace_secs: default_cleanup_grace(),
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("upload")
}

fn default_cleanup_grace() -> u64 {
    2
}

fn default_retention() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("morpho.db")
}

/// Config summary for API responses (paths reduced to strings)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: SanitizedServerConfig,
    pub storage: SanitizedStorageConfig,
    pub database: String,
    pub renderer: String,
    pub office: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServerConfig {
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub dir: String,
    pub cleanup_grace_secs: u64,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: SanitizedServerConfig {
                host: config.server.host.to_string(),
                port: config.server.port,
                public_url: config.server.resolved_public_url(),
                body_limit_bytes: config.server.body_limit_bytes,
            },
            storage: SanitizedStorageConfig {
                dir: config.storage.dir.display().to_string(),
                cleanup_grace_secs: config.storage.cleanup_grace_secs,
                retention_secs: config.storage.retention_secs,
                sweep_interval_secs: config.storage.sweep_interval_secs,
            },
            database: config.database.path.display().to_string(),
            renderer: config.renderer.chromium_path.display().to_string(),
            office: config.office.soffice_path.display().to_string(),
        }
    }
}
