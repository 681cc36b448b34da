//! Server configuration.
//!
//! Values come from an optional `urm.toml` in the working directory,
//! overridden by `URM__`-prefixed environment variables with `__` as the
//! nesting separator (e.g. `URM__DATABASE__URL`, `URM__AUTH__PEPPER`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use urm_auth::AuthConfig;
use urm_db::DbConfig;

const ENV_PREFIX: &str = "URM";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_CONFIG_FILE: &str = "urm";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing JWT key: set auth.{0} or {0}_file")]
    MissingKey(&'static str),
}

/// Account made admin at startup (`URM__BOOTSTRAP_ADMIN__EMAIL`,
/// `URM__BOOTSTRAP_ADMIN__PASSWORD`).
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    pub bind_addr: String,
    pub database: DbConfig,
    pub auth: AuthConfig,
    /// PEM file for the JWT signing key; takes precedence over
    /// `auth.jwt_private_key_pem`.
    pub jwt_private_key_pem_file: Option<PathBuf>,
    pub jwt_public_key_pem_file: Option<PathBuf>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            jwt_private_key_pem_file: None,
            jwt_public_key_pem_file: None,
            bootstrap_admin: None,
        }
    }
}

impl ServerConfig {
    /// Load from `urm.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse a TOML document, without consulting the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// The auth configuration with key files resolved into PEM strings.
    pub fn resolved_auth(&self) -> Result<AuthConfig, ConfigError> {
        let mut auth = self.auth.clone();
        if let Some(path) = &self.jwt_private_key_pem_file {
            auth.jwt_private_key_pem = read_key(path)?;
        }
        if let Some(path) = &self.jwt_public_key_pem_file {
            auth.jwt_public_key_pem = read_key(path)?;
        }
        if auth.jwt_private_key_pem.is_empty() {
            return Err(ConfigError::MissingKey("jwt_private_key_pem"));
        }
        if auth.jwt_public_key_pem.is_empty() {
            return Err(ConfigError::MissingKey("jwt_public_key_pem"));
        }
        Ok(auth)
    }
}

fn read_key(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database.namespace, "urm");
        assert_eq!(config.auth.access_token_lifetime_secs, 60_000);
        assert_eq!(config.auth.min_password_length, 10);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn nested_sections_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            bind_addr = "127.0.0.1:9000"

            [database]
            url = "mem://"

            [auth]
            jwt_issuer = "urm-staging"
            min_password_length = 12

            [bootstrap_admin]
            email = "root@example.com"
            password = "root-password-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.database.database, "main");
        assert_eq!(config.auth.jwt_issuer, "urm-staging");
        assert_eq!(config.auth.min_password_length, 12);
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
    }

    #[test]
    fn missing_keys_are_reported() {
        let config = ServerConfig::default();
        assert!(matches!(
            config.resolved_auth(),
            Err(ConfigError::MissingKey("jwt_private_key_pem"))
        ));

        let config = ServerConfig {
            jwt_private_key_pem_file: Some("/nonexistent/urm-key.pem".into()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.resolved_auth(),
            Err(ConfigError::KeyFile { .. })
        ));
    }
}
