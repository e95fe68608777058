use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::projector::{ProjectionLimits, DEFAULT_BUNK_CAP, DEFAULT_NEEDS_CAP};

fn default_username() -> String {
    "student".to_string()
}
fn default_target_percent() -> f64 {
    75.0
}
fn default_bunk_cap() -> u32 {
    DEFAULT_BUNK_CAP
}
fn default_needs_cap() -> u32 {
    DEFAULT_NEEDS_CAP
}
fn default_minutes() -> u32 {
    25
}
fn default_daily_goal() -> u32 {
    120
}
fn default_weekly_goal() -> u32 {
    600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Key under which study data is stored.
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    #[serde(default = "default_target_percent")]
    pub target_percent: f64,
    #[serde(default = "default_bunk_cap")]
    pub bunk_cap: u32,
    #[serde(default = "default_needs_cap")]
    pub needs_cap: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            target_percent: default_target_percent(),
            bunk_cap: default_bunk_cap(),
            needs_cap: default_needs_cap(),
        }
    }
}

impl AttendanceConfig {
    pub fn limits(&self) -> ProjectionLimits {
        ProjectionLimits {
            bunk_cap: self.bunk_cap,
            needs_cap: self.needs_cap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    /// Seed goals for a user's first study data.
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal_minutes: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            daily_goal_minutes: default_daily_goal(),
            weekly_goal_minutes: default_weekly_goal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub study: StudyConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "bunkwise")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("bunkwise.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
