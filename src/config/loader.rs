//! TOML settings and their override chain.

use crate::model::SenderId;
use crate::state::{ChatViewOptions, WindowSettings};
use crate::view_state::{LayoutParams, RenderOptions, ViewportDimensions};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CHATLOG_VIEW_CONFIG";

/// Environment variable overriding `max_window_size`.
pub const MAX_WINDOW_ENV: &str = "CHATLOG_VIEW_MAX_WINDOW";

/// Failure to load or validate configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config path is unusable.
    #[error("bad config path: {0}")]
    InvalidPath(String),

    /// The file exists but could not be read.
    #[error("cannot read config {path}: {reason}")]
    ReadError {
        /// Config file.
        path: PathBuf,
        /// I/O message.
        reason: String,
    },

    /// The file is not valid TOML for [`ConfigFile`].
    #[error("cannot parse config {path}: {reason}")]
    ParseError {
        /// Config file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A setting has an unusable value.
    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        /// Offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// On-disk settings, read from `~/.config/chatlog-view/config.toml`.
///
/// Unset fields keep the engine default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Upper bound on materialized entries.
    #[serde(default)]
    pub max_window_size: Option<usize>,

    /// Entries loaded or evicted at once.
    #[serde(default)]
    pub window_chunk_size: Option<usize>,

    /// Entries materialized when the view opens.
    #[serde(default)]
    pub initial_load: Option<usize>,

    /// Lines laid out per relayout step.
    #[serde(default)]
    pub relayout_step: Option<usize>,

    /// Seconds after which a repeated sender shows its name again.
    #[serde(default)]
    pub repeat_name_after_secs: Option<u32>,

    /// Blank rows between lines.
    #[serde(default)]
    pub line_spacing: Option<u16>,

    /// Width of the author column.
    #[serde(default)]
    pub name_column_width: Option<u16>,

    /// Width of the timestamp column.
    #[serde(default)]
    pub timestamp_column_width: Option<u16>,

    /// Pointer travel before a press becomes a drag.
    #[serde(default)]
    pub drag_threshold: Option<u32>,

    /// Rows scrolled per tick while drag-selecting outside the viewport.
    #[serde(default)]
    pub autoscroll_speed: Option<u16>,

    /// strftime format of date separators.
    #[serde(default)]
    pub date_format: Option<String>,

    /// strftime format of the timestamp column.
    #[serde(default)]
    pub timestamp_format: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Settings after defaults, file, environment and CLI have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Upper bound on materialized entries.
    pub max_window_size: usize,
    /// Entries loaded or evicted at once.
    pub window_chunk_size: usize,
    /// Entries materialized when the view opens.
    pub initial_load: usize,
    /// Lines laid out per relayout step.
    pub relayout_step: usize,
    /// Seconds after which a repeated sender shows its name again.
    pub repeat_name_after_secs: u32,
    /// Blank rows between lines.
    pub line_spacing: u16,
    /// Width of the author column.
    pub name_column_width: u16,
    /// Width of the timestamp column.
    pub timestamp_column_width: u16,
    /// Pointer travel before a press becomes a drag.
    pub drag_threshold: u32,
    /// Rows scrolled per drag auto-scroll tick.
    pub autoscroll_speed: u16,
    /// strftime format of date separators.
    pub date_format: String,
    /// strftime format of the timestamp column.
    pub timestamp_format: String,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let window = WindowSettings::default();
        let layout = LayoutParams::default();
        let view = ChatViewOptions::default();
        let render = RenderOptions::default();
        Self {
            max_window_size: window.max_window_size,
            window_chunk_size: window.window_chunk_size,
            initial_load: view.initial_load,
            relayout_step: window.relayout_step,
            repeat_name_after_secs: render.repeat_name_after.num_seconds() as u32,
            line_spacing: layout.line_spacing,
            name_column_width: layout.name_width,
            timestamp_column_width: layout.timestamp_width,
            drag_threshold: view.drag_threshold,
            autoscroll_speed: view.autoscroll_speed,
            date_format: view.date_format,
            timestamp_format: render.timestamp_format,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Reject settings the window engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero window, a chunk that is not
    /// smaller than the window, or a zero relayout step.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_window_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_window_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.window_chunk_size == 0 || self.window_chunk_size >= self.max_window_size {
            return Err(ConfigError::Invalid {
                field: "window_chunk_size",
                reason: format!(
                    "must be between 1 and max_window_size - 1 ({}), got {}",
                    self.max_window_size - 1,
                    self.window_chunk_size
                ),
            });
        }
        if self.relayout_step == 0 {
            return Err(ConfigError::Invalid {
                field: "relayout_step",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// View options for a viewport of `dimensions`.
    ///
    /// `local_sender` marks lines of the local user.
    pub fn view_options(
        &self,
        dimensions: ViewportDimensions,
        local_sender: Option<SenderId>,
    ) -> ChatViewOptions {
        ChatViewOptions {
            window: WindowSettings {
                max_window_size: self.max_window_size,
                window_chunk_size: self.window_chunk_size,
                relayout_step: self.relayout_step,
            },
            layout: LayoutParams {
                width: dimensions.width,
                name_width: self.name_column_width,
                timestamp_width: self.timestamp_column_width,
                line_spacing: self.line_spacing,
            },
            render: RenderOptions {
                timestamp_format: self.timestamp_format.clone(),
                repeat_name_after: TimeDelta::seconds(i64::from(self.repeat_name_after_secs)),
                local_sender,
            },
            date_format: self.date_format.clone(),
            dimensions,
            initial_load: self.initial_load,
            drag_threshold: self.drag_threshold,
            autoscroll_speed: self.autoscroll_speed,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatlog-view/chatlog-view.log` on Unix-like
/// systems, or the platform state directory elsewhere.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("chatlog-view").join("chatlog-view.log")
    } else {
        PathBuf::from("chatlog-view.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/chatlog-view/config.toml` on Unix, the platform config
/// directory elsewhere. `None` if it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatlog-view").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATLOG_VIEW_CONFIG` environment variable
/// 3. Default path `~/.config/chatlog-view/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `CHATLOG_VIEW_MAX_WINDOW`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the variable is not a number.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(MAX_WINDOW_ENV) {
        config.max_window_size = raw.trim().parse().map_err(|_| ConfigError::Invalid {
            field: "max_window_size",
            reason: format!("{MAX_WINDOW_ENV}={raw:?} is not a number"),
        })?;
    }

    Ok(config)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        max_window_size: config.max_window_size.unwrap_or(defaults.max_window_size),
        window_chunk_size: config
            .window_chunk_size
            .unwrap_or(defaults.window_chunk_size),
        initial_load: config.initial_load.unwrap_or(defaults.initial_load),
        relayout_step: config.relayout_step.unwrap_or(defaults.relayout_step),
        repeat_name_after_secs: config
            .repeat_name_after_secs
            .unwrap_or(defaults.repeat_name_after_secs),
        line_spacing: config.line_spacing.unwrap_or(defaults.line_spacing),
        name_column_width: config
            .name_column_width
            .unwrap_or(defaults.name_column_width),
        timestamp_column_width: config
            .timestamp_column_width
            .unwrap_or(defaults.timestamp_column_width),
        drag_threshold: config.drag_threshold.unwrap_or(defaults.drag_threshold),
        autoscroll_speed: config.autoscroll_speed.unwrap_or(defaults.autoscroll_speed),
        date_format: config.date_format.unwrap_or(defaults.date_format),
        timestamp_format: config.timestamp_format.unwrap_or(defaults.timestamp_format),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    max_window_override: Option<usize>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(max_window) = max_window_override {
        config.max_window_size = max_window;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

/// Full precedence chain, validated.
///
/// # Errors
///
/// Propagates file, env and validation errors.
pub fn resolve(
    config_path: Option<PathBuf>,
    max_window_override: Option<usize>,
    log_file_override: Option<PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file))?;
    apply_cli_overrides(config, max_window_override, log_file_override).validate()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
