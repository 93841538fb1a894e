use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("autoclear"))
}

/// Defaults read from `~/.config/autoclear/config.toml`.
///
/// Command-line flags take precedence over every value here.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default file name prefix
    pub prefix: Option<String>,
    /// Default directory to clear; `~` is expanded
    pub directory: Option<String>,
    /// Walk subdirectories by default
    pub recursive: bool,
}

impl Settings {
    /// Load settings from `explicit`, or from the default location if it exists.
    ///
    /// A missing default file yields empty settings; a missing explicit file is
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let path = match config_dir() {
            Ok(dir) => dir.join("config.toml"),
            Err(e) => {
                log::debug!("No config directory: {e}");
                return Ok(Self::default());
            }
        };

        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Get expanded default directory path
    pub fn directory_path(&self) -> Option<PathBuf> {
        self.directory
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "prefix = \"db_\"\ndirectory = \"/var/backups\"\nrecursive = true\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.prefix.as_deref(), Some("db_"));
        assert_eq!(settings.directory_path(), Some(PathBuf::from("/var/backups")));
        assert!(settings.recursive);
    }

    #[test]
    fn test_empty_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "buckets = 3\n").unwrap();

        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");

        assert!(Settings::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_directory_tilde_expansion() {
        let home = dirs::home_dir().unwrap();
        let settings = Settings {
            directory: Some("~/backups".to_string()),
            ..Settings::default()
        };

        assert_eq!(settings.directory_path(), Some(home.join("backups")));
    }
}
