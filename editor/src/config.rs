//! Action builder configuration loaded from `actions.toml`.
//!
//! ```toml
//! [snapshots]
//! format = "bincode"   # or "ron"
//!
//! [create_node]
//! scope = "scene-wide" # "none" | "attribute-only" | "entity-local" | "scene-wide"
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};

use quill_scene::serialize::Format;
use quill_scene::{Scene, ScopeHint};
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading an [`ActionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level action configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub snapshots: SnapshotConfig,
    pub create_node: CreateNodeConfig,
}

/// Encoding of entity and scene snapshots.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub format: Format,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreateNodeConfig {
    pub scope: CreateNodeScope,
}

/// Scope hint given to [`CreateNodeActionBuilder`](crate::CreateNodeActionBuilder)
/// when the caller doesn't pass one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreateNodeScope {
    /// Creation never disturbs pre-existing state.
    None,
    AttributeOnly,
    EntityLocal,
    /// Capture the whole scene before creating.
    #[default]
    SceneWide,
}

impl CreateNodeScope {
    pub fn hint(self) -> Option<ScopeHint> {
        match self {
            Self::None => None,
            Self::AttributeOnly => Some(ScopeHint::AttributeOnly),
            Self::EntityLocal => Some(ScopeHint::EntityLocal),
            Self::SceneWide => Some(ScopeHint::SceneWide),
        }
    }
}

impl ActionConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies scene-level settings.
    pub fn apply(&self, scene: &mut Scene) {
        scene.set_snapshot_format(self.snapshots.format);
    }
}

/// Load an action config from a TOML file.
pub fn load_config(path: &Path) -> Result<ActionConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ActionConfig::from_toml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an action config, falling back to defaults if the file is missing
/// or malformed.
pub fn load_or_default(path: &Path) -> ActionConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded action config: {:?} snapshots, create-node scope {:?}",
                config.snapshots.format,
                config.create_node.scope
            );
            config
        }
        Err(e) => {
            log::warn!("No action config ({e}), using defaults");
            ActionConfig::default()
        }
    }
}
