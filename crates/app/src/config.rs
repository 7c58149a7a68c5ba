//! Settings persistence: `settings.json` under the platform config dir.

use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let proj = directories::ProjectDirs::from("com.local", "StudyAI", "StudyAI")
        .ok_or(ConfigError::NoConfigDir)?;
    fs::create_dir_all(proj.config_dir())?;
    Ok(proj.config_dir().join("settings.json"))
}

/// Load persisted settings, falling back to defaults on any problem. A fresh
/// install has no settings file; that is not worth surfacing to the user.
pub fn load_or_default() -> AppSettings {
    match config_path().and_then(|p| load_from(&p)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("using default settings: {}", e);
            AppSettings::default()
        }
    }
}

pub fn save(settings: &AppSettings) -> Result<(), ConfigError> {
    let path = config_path()?;
    save_to(&path, settings)
}

fn load_from(path: &Path) -> Result<AppSettings, ConfigError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn save_to(path: &Path, settings: &AppSettings) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = AppSettings::default();
        settings.user_profile.name = "Sam".to_string();
        settings.user_profile.dark_mode = true;
        settings.gemini_auth.api_key = Some("test-key".to_string());

        save_to(&path, &settings).unwrap();
        let loaded = load_from(&path).unwrap();

        assert_eq!(loaded.gemini_model, settings.gemini_model);
        assert_eq!(loaded.user_profile.name, "Sam");
        assert!(loaded.user_profile.dark_mode);
        assert_eq!(loaded.gemini_auth.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("absent.json")).is_err());
    }
}
