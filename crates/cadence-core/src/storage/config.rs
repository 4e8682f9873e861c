//! TOML-based application configuration.
//!
//! Stores the weekly challenge settings:
//! - Selection strategy and total slot count
//! - Per-protocol enablement, weekly caps, and enabled-id sets
//!
//! Configuration is stored at `~/.config/cadence/config.toml`. A missing
//! file yields defaults; unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::challenge::{ProtocolKey, SelectionStrategy};
use crate::error::ConfigError;
use crate::okr::Pillar;

/// Per-protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cap")]
    pub max_per_week: u32,
    /// Habit ids eligible for the habits-slipping protocol.
    #[serde(default)]
    pub enabled_habits: Vec<String>,
    /// Pillars eligible for the priorities-progress protocol.
    #[serde(default = "default_pillars")]
    pub enabled_pillars: Vec<Pillar>,
    /// Key-result ids eligible for the OKRs-progress protocol.
    #[serde(default)]
    pub enabled_krs: Vec<String>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_per_week: default_cap(),
            enabled_habits: Vec::new(),
            enabled_pillars: default_pillars(),
            enabled_krs: Vec::new(),
        }
    }
}

/// Protocol configuration table, one entry per protocol key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolsConfig {
    #[serde(default)]
    pub habits_slipping: ProtocolConfig,
    #[serde(default)]
    pub priorities_progress: ProtocolConfig,
    #[serde(default)]
    pub okrs_progress: ProtocolConfig,
    #[serde(default)]
    pub placeholder: ProtocolConfig,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: SelectionStrategy,
    /// Total weekly challenge slots.
    #[serde(default = "default_slots")]
    pub slots: usize,
    #[serde(default)]
    pub protocols: ProtocolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            slots: default_slots(),
            protocols: ProtocolsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/cadence"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Per-protocol configuration by key.
    pub fn protocol(&self, key: ProtocolKey) -> &ProtocolConfig {
        match key {
            ProtocolKey::HabitsSlipping => &self.protocols.habits_slipping,
            ProtocolKey::PrioritiesProgress => &self.protocols.priorities_progress,
            ProtocolKey::OkrsProgress => &self.protocols.okrs_progress,
            ProtocolKey::Placeholder => &self.protocols.placeholder,
        }
    }

    pub fn protocol_mut(&mut self, key: ProtocolKey) -> &mut ProtocolConfig {
        match key {
            ProtocolKey::HabitsSlipping => &mut self.protocols.habits_slipping,
            ProtocolKey::PrioritiesProgress => &mut self.protocols.priorities_progress,
            ProtocolKey::OkrsProgress => &mut self.protocols.okrs_progress,
            ProtocolKey::Placeholder => &mut self.protocols.placeholder,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cap() -> u32 {
    1
}

fn default_slots() -> usize {
    3
}

fn default_pillars() -> Vec<Pillar> {
    Pillar::ALL.to_vec()
}
