use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "game-catalog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file. `~/` is expanded.
    database: Option<String>,
    pub port: u16,
    /// Origins allowed by CORS in release builds.
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            port: 3000,
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Load the default config file, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the default path, unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory available"))?;
        Self::default().write_if_missing(&path)?;
        Ok(path)
    }

    fn write_if_missing(&self, path: &Path) -> Result<()> {
        if path.exists() {
            tracing::info!("Config already exists at: {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn set_database_path(&mut self, path: &Path) {
        self.database = Some(path.to_string_lossy().into_owned());
    }

    /// Get expanded database path
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => Self::expand_path(path),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("catalog.db"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert!(config.database_path().ends_with("game-catalog/catalog.db"));
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            database = "/srv/catalog.db"
            port = 8080
            allowed_origins = ["https://games.example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path(), PathBuf::from("/srv/catalog.db"));
        assert_eq!(config.allowed_origins, vec!["https://games.example.com"]);
    }

    #[test]
    fn test_expand_home() {
        let expanded = Config::expand_path("~/catalog.db");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("catalog.db"));
        }
        assert_eq!(
            Config::expand_path("relative.db"),
            PathBuf::from("relative.db")
        );
    }

    #[test]
    fn test_from_file_and_write_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.port = 4000;
        config.write_if_missing(&path).unwrap();

        // An existing file is left alone
        Config::default().write_if_missing(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.port, 4000);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_set_database_path() {
        let mut config = Config::default();
        config.set_database_path(Path::new("/tmp/override.db"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/override.db"));
    }
}
