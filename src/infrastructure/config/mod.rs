use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use validator::Validate;

pub const CONFIG_FILE: &str = "sheetdrop.toml";
pub const ENV_PREFIX: &str = "SHEETDROP_";

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub database_url: String,
    #[validate(length(min = 1))]
    pub upload_dir: String,
    #[validate(range(min = 1))]
    pub max_upload_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://sheetdrop.db".to_string(),
            upload_dir: "uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Defaults, then `sheetdrop.toml`, then `SHEETDROP_*`, then bare `PORT` / `DATABASE_URL`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().only(&["port", "database_url"]))
    }

    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load config: {}", e)))?;

        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid config: {}", e)))?;

        Ok(config)
    }

    pub fn upload_path(&self) -> PathBuf {
        PathBuf::from(&self.upload_dir)
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host={} port={} database_url={} upload_dir={} max_upload_bytes={}",
            self.host, self.port, self.database_url, self.upload_dir, self.max_upload_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.port, 5000);
            assert_eq!(config.upload_dir, "uploads");
            assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
            assert_eq!(config.database_url, "sqlite://sheetdrop.db");
            Ok(())
        });
    }

    #[test]
    fn test_toml_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                port = 7000
                upload_dir = "/tmp/sheets"
                "#,
            )?;
            jail.set_env("SHEETDROP_PORT", "7100");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.port, 7100);
            assert_eq!(config.upload_dir, "/tmp/sheets");
            Ok(())
        });
    }

    #[test]
    fn test_bare_port_and_database_url() {
        Jail::expect_with(|jail| {
            jail.set_env("SHEETDROP_PORT", "7100");
            jail.set_env("PORT", "8080");
            jail.set_env("DATABASE_URL", "sqlite::memory:");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.database_url, "sqlite::memory:");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SHEETDROP_MAX_UPLOAD_BYTES", "0");
            assert!(matches!(AppConfig::load(), Err(AppError::ConfigError(_))));
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.set_env("PORT", "not-a-port");
            assert!(matches!(AppConfig::load(), Err(AppError::ConfigError(_))));
            Ok(())
        });
    }
}
