use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{AuthSettings, Settings};

/// Environment variable names recognized by the loader.
const ENV_JWT_SECRET: &str = "APERTURE_JWT_SECRET";
const ENV_JWT_ALGORITHM: &str = "APERTURE_JWT_ALGORITHM";
const ENV_ACCESS_TTL: &str = "APERTURE_ACCESS_TOKEN_TTL";
const ENV_REFRESH_TTL: &str = "APERTURE_REFRESH_TOKEN_TTL";
const ENV_EMAIL_TTL: &str = "APERTURE_EMAIL_TOKEN_TTL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid duration for {key}: {value}")]
    InvalidDuration { key: String, value: String },

    #[error("signing secret is missing: set {ENV_JWT_SECRET} or [auth].jwt_secret")]
    MissingSecret,
}

/// On-disk shape of the settings file; every field optional so the file can
/// stay minimal.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(default)]
    auth: FileAuthSettings,
}

#[derive(Debug, Default, Deserialize)]
struct FileAuthSettings {
    jwt_secret: Option<String>,
    jwt_algorithm: Option<String>,
    /// Humantime string, e.g. "1h" or "7days".
    access_token_ttl: Option<String>,
    refresh_token_ttl: Option<String>,
    email_token_ttl: Option<String>,
}

/// Loads [`Settings`] from an optional TOML file with environment
/// overrides layered on top.
///
/// Precedence, lowest to highest: built-in defaults, file, environment.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
    load_dotenv: bool,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this TOML file before applying environment overrides.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load a `.env` file from the working directory first, if present.
    pub fn with_dotenv(mut self) -> Self {
        self.load_dotenv = true;
        self
    }

    pub fn load(&self) -> Result<Settings, ConfigError> {
        if self.load_dotenv && dotenvy::dotenv().is_ok() {
            debug!("loaded .env file");
        }

        let file = match &self.path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str::<FileSettings>(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            _ => FileSettings::default(),
        };

        let jwt_secret = env_string(ENV_JWT_SECRET)
            .or(file.auth.jwt_secret)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let jwt_algorithm = env_string(ENV_JWT_ALGORITHM)
            .or(file.auth.jwt_algorithm)
            .unwrap_or_else(|| AuthSettings::DEFAULT_ALGORITHM.to_string());

        let access_token_ttl = resolve_ttl(
            ENV_ACCESS_TTL,
            file.auth.access_token_ttl,
            AuthSettings::DEFAULT_ACCESS_TTL,
        )?;
        let refresh_token_ttl = resolve_ttl(
            ENV_REFRESH_TTL,
            file.auth.refresh_token_ttl,
            AuthSettings::DEFAULT_REFRESH_TTL,
        )?;
        let email_token_ttl = resolve_ttl(
            ENV_EMAIL_TTL,
            file.auth.email_token_ttl,
            AuthSettings::DEFAULT_EMAIL_TTL,
        )?;

        Ok(Settings {
            auth: AuthSettings {
                jwt_secret,
                jwt_algorithm,
                access_token_ttl,
                refresh_token_ttl,
                email_token_ttl,
            },
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn resolve_ttl(
    env_key: &str,
    file_value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = env_string(env_key).or(file_value) else {
        return Ok(default);
    };
    humantime::parse_duration(&raw).map_err(|_| ConfigError::InvalidDuration {
        key: env_key.to_string(),
        value: raw,
    })
}
