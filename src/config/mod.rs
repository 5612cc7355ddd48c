//! Configuration loading (files in `~/.codex`, then environment).
//!
//! Nothing here is global: the binary loads an [`AppConfig`] once and passes
//! the pieces it needs into the provider and agent loop constructors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent_loop::ApprovalPolicy;
use crate::error::CodexError;

/// Model used when the config file leaves `model` empty.
pub const DEFAULT_AGENTIC_MODEL: &str = "codex-mini-latest";
/// Model used in full-context mode when the config file leaves `model` empty.
pub const DEFAULT_FULL_CONTEXT_MODEL: &str = "gpt-4.1";

const CONFIG_DIR_NAME: &str = ".codex";

/// Locations of the config and instructions files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    /// Tried in order when `config_file` does not exist.
    pub fallbacks: Vec<PathBuf>,
    pub instructions_file: PathBuf,
}

impl ConfigPaths {
    /// Standard layout inside `dir`: `config.json` with YAML fallbacks and
    /// `instructions.md`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config_file: dir.join("config.json"),
            fallbacks: vec![dir.join("config.yaml"), dir.join("config.yml")],
            instructions_file: dir.join("instructions.md"),
        }
    }

    /// `~/.codex`.
    pub fn default_location() -> Result<Self, CodexError> {
        let home = directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| CodexError::Configuration("cannot locate home directory".into()))?;
        Ok(Self::in_dir(home.join(CONFIG_DIR_NAME)))
    }

    /// Use an explicit config file; fallbacks are disabled.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self.fallbacks.clear();
        self
    }

    pub fn with_instructions_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.instructions_file = path.into();
        self
    }

    /// The config file that will actually be read (or bootstrapped).
    pub fn resolve_config_file(&self) -> &Path {
        if self.config_file.exists() {
            return &self.config_file;
        }
        self.fallbacks
            .iter()
            .find(|path| path.exists())
            .unwrap_or(&self.config_file)
    }
}

/// Keys read from the config file. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_mode: Option<ApprovalPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Pick [`DEFAULT_FULL_CONTEXT_MODEL`] instead of the agentic default.
    pub full_context: bool,
}

/// Fully resolved configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model: String,
    pub provider: Option<String>,
    pub instructions: String,
    pub approval_policy: ApprovalPolicy,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("instructions", &self.instructions)
            .field("approval_policy", &self.approval_policy)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AppConfig {
    /// Fill the API key and base URL from the environment (and `.env`).
    pub fn with_env_api_key(mut self) -> Self {
        let _ = dotenvy::dotenv();
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty_env("OPENAI_BASE_URL") {
            self.base_url = Some(url);
        }
        self
    }

    /// The API key, or a configuration error when none is set.
    pub fn require_api_key(&self) -> Result<&str, CodexError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CodexError::Configuration("Missing OPENAI_API_KEY".into()))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration, bootstrapping missing files.
///
/// Unreadable or malformed files count as empty; this never fails.
pub fn load_config(paths: &ConfigPaths, options: LoadOptions) -> AppConfig {
    let config_path = paths.resolve_config_file().to_path_buf();
    let config_exists = config_path.exists();

    let stored = if config_exists {
        read_stored_config(&config_path)
    } else {
        StoredConfig::default()
    };

    let instructions = fs::read_to_string(&paths.instructions_file).unwrap_or_default();

    let model = stored
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if options.full_context {
                DEFAULT_FULL_CONTEXT_MODEL.to_string()
            } else {
                DEFAULT_AGENTIC_MODEL.to_string()
            }
        });

    if !config_exists {
        if let Err(e) = bootstrap_config(&config_path) {
            debug!(path = %config_path.display(), error = %e, "could not bootstrap config file");
        }
    }
    if !paths.instructions_file.exists() {
        if let Err(e) = write_creating_parent(&paths.instructions_file, &instructions) {
            debug!(
                path = %paths.instructions_file.display(),
                error = %e,
                "could not bootstrap instructions file"
            );
        }
    }

    AppConfig {
        model,
        provider: stored.provider,
        instructions,
        approval_policy: stored.approval_mode.unwrap_or_default(),
        api_key: None,
        base_url: stored.base_url,
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn read_stored_config(path: &Path) -> StoredConfig {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config file");
            return StoredConfig::default();
        }
    };

    let parsed = if is_yaml(path) {
        serde_yaml::from_str::<Option<StoredConfig>>(&text)
            .map(Option::unwrap_or_default)
            .map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<StoredConfig>(&text).map_err(|e| e.to_string())
    };

    parsed.unwrap_or_else(|error| {
        warn!(path = %path.display(), %error, "ignoring malformed config file");
        StoredConfig::default()
    })
}

fn bootstrap_config(path: &Path) -> Result<(), CodexError> {
    let empty = StoredConfig {
        model: Some(String::new()),
        ..Default::default()
    };
    let body = if is_yaml(path) {
        serde_yaml::to_string(&empty).map_err(|e| CodexError::Configuration(e.to_string()))?
    } else {
        serde_json::to_string_pretty(&empty)?
    };
    write_creating_parent(path, &body)
}

fn write_creating_parent(path: &Path, contents: &str) -> Result<(), CodexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
