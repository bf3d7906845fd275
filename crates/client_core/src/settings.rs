//! Layered client configuration: defaults, optional TOML files, `RESUME_CHAT__*`
//! environment variables, then command line overrides.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::controller::ControllerSettings;

pub const CONFIG_FILE_NAME: &str = "resume_chat.toml";
pub const ENV_PREFIX: &str = "RESUME_CHAT";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("invalid api_base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub context_chunks: u32,
    /// Zero disables background polling.
    pub status_poll_interval_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 30,
            context_chunks: shared::protocol::DEFAULT_CONTEXT_CHUNKS,
            status_poll_interval_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            context_chunks: self.context_chunks,
        }
    }

    pub fn status_poll_interval(&self) -> Option<Duration> {
        (self.status_poll_interval_secs > 0)
            .then(|| Duration::from_secs(self.status_poll_interval_secs))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let url = Url::parse(self.api_base_url.trim()).map_err(|err| {
            SettingsError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
                reason: err.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be at least 1 second".into(),
            });
        }
        if self.context_chunks == 0 {
            return Err(SettingsError::InvalidValue {
                key: "context_chunks",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub context_chunks: Option<u32>,
    pub status_poll_interval_secs: Option<u64>,
}

/// Per-user configuration file, e.g. `~/.config/resume_chat/resume_chat.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("resume_chat").join(CONFIG_FILE_NAME))
}

pub fn load_settings(overrides: &SettingsOverrides) -> Result<ClientSettings, SettingsError> {
    load_settings_from(
        user_config_path().as_deref(),
        Path::new(CONFIG_FILE_NAME),
        None,
        overrides,
    )
}

/// `env_vars` replaces the process environment when given.
fn load_settings_from(
    user_file: Option<&Path>,
    local_file: &Path,
    env_vars: Option<Map<String, String>>,
    overrides: &SettingsOverrides,
) -> Result<ClientSettings, SettingsError> {
    let mut builder = Config::builder().add_source(Config::try_from(&ClientSettings::default())?);

    if let Some(path) = user_file {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }
    builder = builder.add_source(
        File::from(local_file)
            .format(FileFormat::Toml)
            .required(false),
    );
    if let Some(path) = &overrides.config_path {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(true),
        );
    }

    builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env_vars),
        )
        .set_override_option("api_base_url", overrides.api_base_url.clone())?
        .set_override_option("request_timeout_secs", overrides.request_timeout_secs)?
        .set_override_option("context_chunks", overrides.context_chunks.map(u64::from))?
        .set_override_option(
            "status_poll_interval_secs",
            overrides.status_poll_interval_secs,
        )?;

    let settings: ClientSettings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
