//! Layered configuration: built-in defaults, then an optional RON file, then
//! environment variables, then command-line overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vyx_core::{JobProfile, ProfileKind};
use vyx_engine::{SubmitSettings, WireFields};
use vyx_logging::{vyx_debug, vyx_info};

pub const DEFAULT_CONFIG_FILENAME: &str = "vyx.ron";
pub const DEFAULT_STATE_DIR: &str = ".vyx";
pub const DEFAULT_INGEST_WEBHOOK_URL: &str = "https://vyx-n8n.onrender.com/webhook/ingest-content";
pub const DEFAULT_CLIP_WEBHOOK_URL: &str = "https://vyx-n8n.onrender.com/webhook/clip-youtube";

pub const ENV_INGEST_WEBHOOK_URL: &str = "VYX_INGEST_WEBHOOK_URL";
pub const ENV_CLIP_WEBHOOK_URL: &str = "VYX_CLIP_WEBHOOK_URL";
pub const ENV_TIMEOUT_SECS: &str = "VYX_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: String, value: String },
}

/// On-disk shape of `vyx.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub ingest_webhook_url: Option<String>,
    pub clip_webhook_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ingest_webhook_url: String,
    pub clip_webhook_url: String,
    /// Replaces the profile's own budget when set.
    pub timeout_secs: Option<u64>,
    pub state_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ingest_webhook_url: DEFAULT_INGEST_WEBHOOK_URL.to_string(),
            clip_webhook_url: DEFAULT_CLIP_WEBHOOK_URL.to_string(),
            timeout_secs: None,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl Settings {
    /// Resolves defaults, the config file and the environment.
    ///
    /// An explicit `config_path` must exist; without one, `vyx.ron` in the
    /// working directory is read if present. `env` looks up a variable.
    pub fn load<F>(config_path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        let file = match config_path {
            Some(path) => Some(read_config(path)?),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILENAME);
                if path.is_file() {
                    Some(read_config(path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            settings.apply_file(file);
        }

        if let Some(url) = non_empty(env(ENV_INGEST_WEBHOOK_URL)) {
            settings.ingest_webhook_url = url;
        }
        if let Some(url) = non_empty(env(ENV_CLIP_WEBHOOK_URL)) {
            settings.clip_webhook_url = url;
        }
        if let Some(value) = non_empty(env(ENV_TIMEOUT_SECS)) {
            settings.timeout_secs = Some(parse_timeout(ENV_TIMEOUT_SECS, &value)?);
        }

        vyx_debug!("resolved settings: {:?}", settings);
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(url) = non_empty(file.ingest_webhook_url) {
            self.ingest_webhook_url = url;
        }
        if let Some(url) = non_empty(file.clip_webhook_url) {
            self.clip_webhook_url = url;
        }
        if file.timeout_secs.is_some() {
            self.timeout_secs = file.timeout_secs;
        }
        if let Some(dir) = file.state_dir {
            self.state_dir = dir;
        }
    }

    /// Applies command-line overrides for one profile's run.
    pub fn with_overrides(
        mut self,
        kind: ProfileKind,
        endpoint: Option<String>,
        timeout_secs: Option<u64>,
        state_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(endpoint) = non_empty(endpoint) {
            match kind {
                ProfileKind::Content => self.ingest_webhook_url = endpoint,
                ProfileKind::Clips => self.clip_webhook_url = endpoint,
            }
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }

    pub fn endpoint(&self, kind: ProfileKind) -> &str {
        match kind {
            ProfileKind::Content => &self.ingest_webhook_url,
            ProfileKind::Clips => &self.clip_webhook_url,
        }
    }

    /// The profile for `kind` with the configured budget applied.
    pub fn profile(&self, kind: ProfileKind) -> JobProfile {
        let mut profile = match kind {
            ProfileKind::Content => JobProfile::content(),
            ProfileKind::Clips => JobProfile::clips(),
        };
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            profile.budget = Duration::from_secs(secs);
        }
        profile
    }

    /// Transport settings for `profile`. The request-level timeout matches
    /// the profile's budget.
    pub fn submit_settings(&self, profile: &JobProfile) -> SubmitSettings {
        let fields = match profile.kind {
            ProfileKind::Content => WireFields::content(),
            ProfileKind::Clips => WireFields::clips(),
        };
        vyx_info!(
            "{:?} endpoint {} with budget {:?}",
            profile.kind,
            self.endpoint(profile.kind),
            profile.budget
        );
        SubmitSettings::new(self.endpoint(profile.kind), fields, profile.budget)
    }
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_timeout(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
