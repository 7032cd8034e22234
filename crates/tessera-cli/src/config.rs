//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tessera::{TesseraError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TesseraError {
    fn from(err: ConfigError) -> Self {
        TesseraError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (tessera/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config file parses but fails validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TesseraError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("tessera/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "tessera", "tessera") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TesseraError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    config.validate().map_err(|err| {
        let message = match err {
            TesseraError::Config(message) => message,
            other => other.to_string(),
        };
        ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        }
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use tessera::theme::{PaletteName, ThemeMode};

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[style]
palette = "sunset"
theme = "dark"

[export]
large_width = 2400
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.style().palette(), PaletteName::Sunset);
        assert_eq!(config.style().theme(), ThemeMode::Dark);
        assert_eq!(config.export().large_width(), 2400);
        assert_eq!(config.export().small_width(), 800);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TesseraError::Config(msg) if msg.contains("nope.toml")));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[viewport\nmax_zoom = ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[viewport]\nmin_zoom = 2.0\nmax_zoom = 1.0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            TesseraError::Config(msg) if msg.contains("config.toml") && msg.contains("zoom range")
        ));
    }
}
