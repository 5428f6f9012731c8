//! Settings file persistence (JSON).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ConfigError, Settings};

const APP_DIR: &str = "xlbarcode";
const SETTINGS_FILE: &str = "settings.json";

/// Default location of the settings file.
///
/// `$XDG_CONFIG_HOME/xlbarcode/settings.json`, then
/// `$HOME/.config/xlbarcode/settings.json`, then the working directory.
pub fn default_settings_path() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join(APP_DIR).join(SETTINGS_FILE);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(SETTINGS_FILE);
    }
    PathBuf::from(format!("{}-{}", APP_DIR, SETTINGS_FILE))
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings.
    ///
    /// A missing file is a first run: defaults are written and returned.
    /// Anything unreadable, unparsable or out of range is
    /// [`ConfigError::Corrupt`].
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no settings file, writing defaults");
                let settings = Settings::default();
                self.save(&settings)?;
                return Ok(settings);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let settings: Settings =
            serde_json::from_str(&contents).map_err(|e| self.corrupt(e.to_string()))?;
        settings.validate().map_err(|e| self.corrupt(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), "settings loaded");
        Ok(settings)
    }

    /// Validate and write the settings, creating parent directories.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| self.write_error(std::io::Error::other(e)))?;
        fs::write(&self.path, json).map_err(|source| self.write_error(source))?;

        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Overwrite the file with defaults.
    pub fn reset(&self) -> Result<Settings, ConfigError> {
        let settings = Settings::default();
        self.save(&settings)?;
        tracing::info!(path = %self.path.display(), "settings reset to defaults");
        Ok(settings)
    }

    fn corrupt(&self, message: String) -> ConfigError {
        ConfigError::Corrupt {
            path: self.path.clone(),
            message,
        }
    }

    fn write_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Symbology;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("nested").join("settings.json"))
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut settings = Settings::default();
        settings.symbology = Symbology::UpcA;
        settings.padding = true;
        settings.last_output_dir = Some(PathBuf::from("/tmp/out"));
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_missing_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Settings::default()).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("dpi");
        fs::write(store.path(), value.to_string()).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Corrupt { .. }));
        assert!(err.to_string().contains("--reset-config"));
    }

    #[test]
    fn test_out_of_range_value_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Settings::default()).unwrap();

        let contents = fs::read_to_string(store.path())
            .unwrap()
            .replace("\"dpi\": 200", "\"dpi\": 9000");
        fs::write(store.path(), contents).unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Corrupt { .. })));
    }

    #[test]
    fn test_garbage_file_is_corrupt_and_reset_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.load(), Err(ConfigError::Corrupt { .. })));
        store.reset().unwrap();
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_refuses_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut settings = Settings::default();
        settings.font_size_pt = 99;
        assert!(store.save(&settings).is_err());
        assert!(!store.path().exists());
    }
}
