//! Configuration settings.

use crate::error::{SwiftError, SwiftResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwiftConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub import: ImportConfig,
    pub mutation: MutationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("swift_codes.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// What the bulk importer does with a branch whose headquarters is not
/// present yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingParentPolicy {
    /// Write a dangling link; a later incremental headquarters insert repairs it.
    #[default]
    LeaveDangling,
    /// Create a stand-in headquarters from the branch's descriptive fields.
    AutoCreate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub missing_parent: MissingParentPolicy,
}

/// How a single insert groups its statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Entity write, link resolution and repair run as separate statements.
    /// Concurrent inserts of a headquarters and its branch can leave a
    /// dangling link that nothing repairs.
    #[default]
    Statementwise,
    /// All steps run in one immediate transaction.
    Atomic,
}

/// What happens to branch links when a code is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Links are left as they are and may reference a missing code.
    #[default]
    PreserveOrphans,
    /// The deleted code's own link is removed and links pointing at it become
    /// dangling again.
    Cascade,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub insert_mode: InsertMode,
    pub delete_policy: DeletePolicy,
}

impl SwiftConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> SwiftResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SwiftResult<Self> {
        let config: SwiftConfig =
            toml::from_str(content).map_err(|e| SwiftError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from `swiftcodes.toml` in the
    /// working directory if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> SwiftResult<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_path = PathBuf::from("swiftcodes.toml");
        if default_path.exists() {
            tracing::info!("Loading config from: {}", default_path.display());
            return Self::from_file(&default_path);
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SwiftResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SwiftError::Config("database.path must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(SwiftError::Config("server.port must not be 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_primary_design() {
        let config = SwiftConfig::default();
        assert_eq!(config.import.missing_parent, MissingParentPolicy::LeaveDangling);
        assert_eq!(config.mutation.insert_mode, InsertMode::Statementwise);
        assert_eq!(config.mutation.delete_policy, DeletePolicy::PreserveOrphans);
        assert_eq!(config.server.port, 8080);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SwiftConfig::from_str(
            r#"
            [import]
            missing_parent = "auto_create"

            [mutation]
            insert_mode = "atomic"
            "#,
        )
        .unwrap();
        assert_eq!(config.import.missing_parent, MissingParentPolicy::AutoCreate);
        assert_eq!(config.mutation.insert_mode, InsertMode::Atomic);
        assert_eq!(config.mutation.delete_policy, DeletePolicy::PreserveOrphans);
        assert_eq!(config.database.path, PathBuf::from("swift_codes.db"));
    }

    #[test]
    fn test_rejects_zero_port() {
        let err = SwiftConfig::from_str("[server]\nport = 0\n").unwrap_err();
        assert!(matches!(err, SwiftError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(SwiftConfig::from_str("[mutation]\ndelete_policy = \"shred\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swiftcodes.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/codes.db\"\nbusy_timeout_ms = 250\n",
        )
        .unwrap();

        let config = SwiftConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/codes.db"));
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(250));
    }
}
