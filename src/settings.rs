use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MoneyTrailError, Result};
use crate::tree::{
    SelfTransfers, TieBreak, TreeConfig, DEFAULT_MAX_CHILDREN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_children")]
    pub max_children_per_node: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
    #[serde(default)]
    pub self_transfers: SelfTransfers,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_children() -> usize {
    DEFAULT_MAX_CHILDREN
}

fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            max_depth: default_max_depth(),
            max_children_per_node: default_max_children(),
            max_nodes: default_max_nodes(),
            tie_break: TieBreak::default(),
            self_transfers: SelfTransfers::default(),
        }
    }
}

impl Settings {
    /// Validated tree bounds. Zero depth or fan-out and a node limit too
    /// small for the root and its branch heads are rejected here so the
    /// builders never see them.
    pub fn tree_config(&self) -> Result<TreeConfig> {
        let config = TreeConfig {
            max_nodes: self.max_nodes,
            tie_break: self.tie_break,
            self_transfers: self.self_transfers,
            ..TreeConfig::new(self.max_depth, self.max_children_per_node)?
        };
        config.validate()?;
        Ok(config)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("moneytrail")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("moneytrail")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files yield defaults; absent fields are filled in.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    settings.tree_config()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| MoneyTrailError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(shellexpand_path(&load_settings().data_dir))
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
