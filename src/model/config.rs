use serde::{Deserialize, Serialize};

use crate::model::view::FilterMode;

/// Key of the slot holding the task collection. The suffix versions the
/// record layout; a new layout gets a new key rather than a migration.
pub const DEFAULT_STORAGE_KEY: &str = "tasks_v1";

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Create the welcome task when the board loads empty
    #[serde(default = "default_true")]
    pub seed_demo: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig { seed_demo: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter used by `list` when none is given
    #[serde(default)]
    pub default_filter: FilterMode,
}
