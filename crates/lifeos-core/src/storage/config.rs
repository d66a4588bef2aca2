//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The watched knowledge directory shared by both schedulers
//! - State file locations
//! - Gardener cadence (interval table, daily cap) and reminder shape
//! - Todoist endpoint
//!
//! Configuration is stored at `~/.config/lifeos/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::garden::{GardenerOptions, IntervalTable};
use crate::sink::ReminderPriority;

/// Watched content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Root scanned by both schedulers. Defaults to `<data dir>/knowledge`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Extension of reviewable documents, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// SM-2 review settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_review_state_file")]
    pub state_file: PathBuf,
}

/// Knowledge gardener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenConfig {
    #[serde(default = "default_garden_state_file")]
    pub state_file: PathBuf,
    /// Maximum reminders pushed by a single sync.
    #[serde(default = "default_daily_cap")]
    pub daily_cap: usize,
    /// Review intervals in days, indexed by stage.
    #[serde(default = "default_intervals")]
    pub intervals: Vec<u32>,
    /// Delete the remote reminder when its document disappears.
    #[serde(default)]
    pub retract_deleted: bool,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: ReminderPriority,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Todoist endpoint configuration. The token lives in the OS keyring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistConfig {
    #[serde(default = "default_todoist_base_url")]
    pub base_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lifeos/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub garden: GardenConfig,
    #[serde(default)]
    pub todoist: TodoistConfig,
}

// Default functions
fn default_extension() -> String {
    "md".into()
}
fn default_review_state_file() -> PathBuf {
    PathBuf::from("flashcard_progress.json")
}
fn default_garden_state_file() -> PathBuf {
    PathBuf::from("garden_state.json")
}
fn default_daily_cap() -> usize {
    3
}
fn default_intervals() -> Vec<u32> {
    IntervalTable::FIBONACCI.to_vec()
}
fn default_labels() -> Vec<String> {
    vec!["review".into()]
}
fn default_priority() -> ReminderPriority {
    ReminderPriority::High
}
fn default_todoist_base_url() -> String {
    "https://api.todoist.com/rest/v2".into()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: default_extension(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            state_file: default_review_state_file(),
        }
    }
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            state_file: default_garden_state_file(),
            daily_cap: default_daily_cap(),
            intervals: default_intervals(),
            retract_deleted: false,
            labels: default_labels(),
            priority: default_priority(),
            project_id: None,
        }
    }
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            base_url: default_todoist_base_url(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of `config.toml` in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory or write and return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject settings the schedulers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        IntervalTable::new(self.garden.intervals.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "garden.intervals".into(),
                message: e.to_string(),
            }
        })?;

        if self.garden.daily_cap == 0 {
            return Err(ConfigError::InvalidValue {
                key: "garden.daily_cap".into(),
                message: "must be at least 1".into(),
            });
        }

        url::Url::parse(&self.todoist.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "todoist.base_url".into(),
            message: e.to_string(),
        })?;

        if self.knowledge.extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "knowledge.extension".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. `self` is left untouched
    /// on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Resolve a possibly relative path against the data directory.
    fn resolve(path: &Path) -> Result<PathBuf, ConfigError> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(data_dir()?.join(path))
        }
    }

    /// Watched knowledge root.
    pub fn knowledge_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.knowledge.dir {
            Some(dir) => Self::resolve(dir),
            None => Ok(data_dir()?.join("knowledge")),
        }
    }

    pub fn review_state_path(&self) -> Result<PathBuf, ConfigError> {
        Self::resolve(&self.review.state_file)
    }

    pub fn garden_state_path(&self) -> Result<PathBuf, ConfigError> {
        Self::resolve(&self.garden.state_file)
    }

    /// The validated interval table.
    pub fn interval_table(&self) -> Result<IntervalTable, ConfigError> {
        IntervalTable::new(self.garden.intervals.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "garden.intervals".into(),
                message: e.to_string(),
            }
        })
    }

    /// Gardener tunables from the `[garden]` section.
    pub fn gardener_options(&self) -> Result<GardenerOptions, ConfigError> {
        Ok(GardenerOptions {
            intervals: self.interval_table()?,
            daily_cap: self.garden.daily_cap,
            retract_deleted: self.garden.retract_deleted,
            tags: self.garden.labels.clone(),
            priority: self.garden.priority,
        })
    }
}
