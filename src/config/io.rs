use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{ConfigError, SessionSettings};
use crate::app_dirs;

/// Default filename used to store session settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the application directory, returning defaults if missing.
pub fn load_or_default() -> Result<SessionSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load_from(path: &Path) -> Result<SessionSettings, ConfigError> {
    if !path.exists() {
        debug!("No config at {}; using defaults", path.display());
        return Ok(SessionSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(SessionSettings::normalized)
}

/// Save settings to `path`, creating parent directories as needed.
pub fn save_to_path(settings: &SessionSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.sample_fraction, 0.3);
        assert_eq!(settings.max_passes, 5);
    }

    #[test]
    fn partial_file_fills_defaults_and_normalizes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sample_fraction = 2.5\nmin_passes = 9\nmax_passes = 4\n").unwrap();
        let settings = load_from(&path).unwrap();
        assert_eq!(settings.sample_fraction, 1.0);
        assert_eq!(settings.min_passes, 4);
        assert_eq!(settings.max_passes, 4);
        assert!(settings.feature_columns.is_empty());
    }

    #[test]
    fn non_positive_fraction_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sample_fraction = 0.0\nfeature_columns = [\"x\", \" \"]\n").unwrap();
        let settings = load_from(&path).unwrap();
        assert_eq!(settings.sample_fraction, 0.3);
        assert_eq!(settings.feature_columns, vec!["x".to_string()]);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_passes = \"many\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn saves_and_reloads_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = SessionSettings {
            sample_fraction: 0.5,
            min_passes: 2,
            max_passes: 3,
            feature_columns: vec!["x".into(), "y".into()],
        };
        save_to_path(&settings, &path).unwrap();
        assert_eq!(load_from(&path).unwrap(), settings);
    }

    #[test]
    fn default_path_uses_app_root() {
        let dir = tempdir().unwrap();
        let _guard = crate::app_dirs::ConfigBaseGuard::set(dir.path().to_path_buf());
        let path = config_path().unwrap();
        assert_eq!(
            path,
            dir.path().join(app_dirs::APP_DIR_NAME).join(CONFIG_FILE_NAME)
        );
        assert_eq!(load_or_default().unwrap(), SessionSettings::default());
    }
}
