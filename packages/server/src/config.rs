use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the blob store.
    pub root: PathBuf,
    pub max_main_file_size: u64,
    pub max_cover_image_size: u64,
    pub max_profile_image_size: u64,
}

impl StorageConfig {
    /// Upper bound for a single stored blob.
    pub fn max_blob_size(&self) -> u64 {
        self.max_main_file_size
            .max(self.max_cover_image_size)
            .max(self.max_profile_image_size)
    }
}

/// Bootstrap administrator created on startup when no account with this
/// email exists yet.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

pub const MIB: u64 = 1024 * 1024;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("storage.root", "./uploads")?
            .set_default("storage.max_main_file_size", 500 * MIB)?
            .set_default("storage.max_cover_image_size", 10 * MIB)?
            .set_default("storage.max_profile_image_size", 5 * MIB)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., GRAPHYKON__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("GRAPHYKON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
