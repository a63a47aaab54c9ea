//! Application configuration module
//!
//! Provides configuration management with TOML file support, a
//! `TICKTASKS_CONFIG_DIR` override, and sensible defaults. [`Settings`] is
//! the handle passed to the service layer and the retention scheduler;
//! nothing reads configuration through global state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Environment variable that relocates the configuration directory.
pub const CONFIG_DIR_ENV: &str = "TICKTASKS_CONFIG_DIR";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_local_db_name")]
    pub local_db_name: String,
}

/// Automatic cleanup of checked tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Checked tasks older than this many days are purged.
    #[serde(default = "default_auto_delete_days")]
    pub auto_delete_days: u32,
    /// Cadence of the scheduled cleanup.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u32,
}

/// Display configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub theme: Theme,
}

/// Desktop notifications posted by the daemon after a cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Numeric form used by the settings surface (0 = light, 1 = dark).
    pub fn index(self) -> u8 {
        match self {
            Theme::Light => 0,
            Theme::Dark => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Theme::Light),
            1 => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" | "0" => Ok(Theme::Light),
            "dark" | "1" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}', expected light or dark", other)),
        }
    }
}

// Default value functions for serde
fn default_local_db_name() -> String {
    "tasks.db".to_string()
}

fn default_auto_delete_days() -> u32 {
    3
}

fn default_interval_hours() -> u32 {
    24
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            local_db_name: default_local_db_name(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            auto_delete_days: default_auto_delete_days(),
            interval_hours: default_interval_hours(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sound: default_true(),
        }
    }
}

impl Config {
    /// Returns the configuration directory (`$TICKTASKS_CONFIG_DIR` or ~/.config/ticktasks/)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = env::var(CONFIG_DIR_ENV)
            && !dir.trim().is_empty()
        {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ticktasks");
        Ok(config_dir)
    }

    /// Returns the configuration file path (config.toml inside the config dir)
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the file the daemon writes its process id to
    pub fn pid_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("daemon.pid"))
    }

    /// Returns the local database path inside the config dir
    ///
    /// # Errors
    ///
    /// Returns an error if the database name contains path traversal sequences.
    pub fn local_db_path(&self) -> Result<PathBuf> {
        let db_name = &self.database.local_db_name;

        if db_name.is_empty()
            || db_name.contains("..")
            || db_name.contains('/')
            || db_name.contains('\\')
        {
            anyhow::bail!(
                "Invalid database name '{}': must be a simple filename without path separators",
                db_name
            );
        }

        Ok(Self::config_dir()?.join(db_name))
    }

    /// Interval between scheduled cleanups, never shorter than one hour.
    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention.interval_hours.max(1)) * 3600)
    }

    /// Load configuration from the default location, or return defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or return defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating the parent directory if needed.
    ///
    /// On Unix the directory is created 0700 and the file written 0600.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(config_dir) = path.parent()
            && !config_dir.as_os_str().is_empty()
            && !config_dir.exists()
        {
            fs::create_dir_all(config_dir).with_context(|| {
                format!("Failed to create config directory: {}", config_dir.display())
            })?;

            #[cfg(unix)]
            {
                let dir_perms = std::fs::Permissions::from_mode(0o700);
                fs::set_permissions(config_dir, dir_perms).with_context(|| {
                    format!(
                        "Failed to set permissions on config directory: {}",
                        config_dir.display()
                    )
                })?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        #[cfg(unix)]
        {
            let file_perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, file_perms).with_context(|| {
                format!("Failed to set permissions on config file: {}", path.display())
            })?;
        }

        Ok(())
    }
}

/// Shared, explicitly refreshed view of the user's settings.
///
/// Cloning is cheap; all clones observe the same values. File-backed
/// handles pick up external edits only when [`Settings::reload`] is called.
#[derive(Debug, Clone)]
pub struct Settings {
    path: Option<PathBuf>,
    inner: Arc<RwLock<Config>>,
}

impl Settings {
    /// Settings backed by the default config file.
    pub fn load() -> Result<Self> {
        Self::from_file(Config::config_path()?)
    }

    /// Settings backed by `path`; defaults are used while the file is missing.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self {
            path: Some(path),
            inner: Arc::new(RwLock::new(config)),
        })
    }

    /// Settings that live only in memory; `reload` is a no-op and `update` never touches disk.
    pub fn in_memory(config: Config) -> Self {
        Self {
            path: None,
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn snapshot(&self) -> Config {
        self.inner.read().await.clone()
    }

    pub async fn auto_delete_days(&self) -> u32 {
        self.inner.read().await.retention.auto_delete_days
    }

    pub async fn retention_interval(&self) -> Duration {
        self.inner.read().await.retention_interval()
    }

    /// Re-read the backing file. On error the previous values stay in effect.
    pub async fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let config = Config::load_from(path)?;
        *self.inner.write().await = config;
        debug!("reloaded settings from {}", path.display());
        Ok(())
    }

    /// Apply `f` and persist the result when file-backed.
    pub async fn update<F>(&self, f: F) -> Result<Config>
    where
        F: FnOnce(&mut Config),
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        f(&mut next);

        if let Some(path) = &self.path {
            next.save_to(path)?;
        }

        *guard = next.clone();
        Ok(next)
    }

    /// Like [`Settings::reload`], but logs and keeps going on failure.
    pub async fn reload_or_keep(&self) {
        if let Err(e) = self.reload().await {
            warn!("could not reload settings, keeping previous values: {e:#}");
        }
    }
}
