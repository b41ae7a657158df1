use std::fs;
use std::path::{Path, PathBuf};

use cardbox_mongo::MongoConfig;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Which backend to open, and how.
///
/// ```toml
/// kind = "filesystem"
/// root = "/var/lib/cardbox"
/// ```
///
/// ```toml
/// kind = "database"
/// host = "db.example"
/// port = 27017
/// username = "debater"
/// password = "secret"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Components and structure under one local directory.
    Filesystem { root: PathBuf },
    /// Components and structure in a MongoDB database.
    Database(MongoConfig),
    /// Volatile in-process storage.
    Memory,
}

impl BackendConfig {
    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::Filesystem { root: root.into() }
    }

    pub fn database(config: MongoConfig) -> Self {
        Self::Database(config)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> BackendResult<Self> {
        toml::from_str(s).map_err(|e| BackendError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> BackendResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| BackendError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> BackendResult<String> {
        toml::to_string(self).map_err(|e| BackendError::Config(e.to_string()))
    }

    /// Short name of the backend kind, as written in `kind = ...`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Filesystem { .. } => "filesystem",
            Self::Database(_) => "database",
            Self::Memory => "memory",
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert_eq!(BackendConfig::default(), BackendConfig::Memory);
        assert_eq!(BackendConfig::default().kind(), "memory");
    }

    #[test]
    fn filesystem_from_toml() {
        let c = BackendConfig::from_toml_str("kind = \"filesystem\"\nroot = \"/tmp/cards\"").unwrap();
        assert_eq!(c, BackendConfig::filesystem("/tmp/cards"));
        assert_eq!(c.kind(), "filesystem");
    }

    #[test]
    fn database_defaults_fill_in() {
        let c = BackendConfig::from_toml_str("kind = \"database\"\nhost = \"db.example\"").unwrap();
        let BackendConfig::Database(db) = c else {
            panic!("expected database config");
        };
        assert_eq!(db.host, "db.example");
        assert_eq!(db.port, 27017);
        assert_eq!(db.database, "cardbox");
        assert!(db.username.is_none());
    }

    #[test]
    fn database_credentials() {
        let c = BackendConfig::from_toml_str(
            "kind = \"database\"\nusername = \"debater\"\npassword = \"secret\"",
        )
        .unwrap();
        let BackendConfig::Database(db) = c else {
            panic!("expected database config");
        };
        assert_eq!(db.address(), "127.0.0.1:27017");
        assert_eq!(db.username.as_deref(), Some("debater"));
        assert_eq!(db.password.as_deref(), Some("secret"));
    }

    #[test]
    fn unknown_kind_is_config_error() {
        assert!(matches!(
            BackendConfig::from_toml_str("kind = \"tape\""),
            Err(BackendError::Config(_))
        ));
        assert!(matches!(
            BackendConfig::from_toml_str("kind = \"filesystem\""),
            Err(BackendError::Config(_))
        ));
    }

    #[test]
    fn toml_roundtrip_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backend.toml");
        let config = BackendConfig::filesystem(dir.path().join("data"));
        fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(BackendConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = BackendConfig::load(Path::new("/nonexistent/cardbox.toml")).unwrap_err();
        assert!(matches!(err, BackendError::Config(_)));
    }
}
