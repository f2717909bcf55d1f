use log::{ debug, warn };
use serde_json::{ Map, Value };
use std::fs;
use std::io::{ self, Write };
use std::path::{ Path, PathBuf };
use tempfile::NamedTempFile;
use thiserror::Error;

pub const CREDENTIAL_KEY: &str = "grok_api_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file IO error: {0}")]
    Io(#[from] io::Error),
    #[error("settings could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("grok-relay")
        .join("settings.json")
}

/// JSON object on disk. Only `grok_api_key` is owned here; other entries
/// are carried through untouched.
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

    pub fn load_credential(&self) -> Result<Option<String>, StoreError> {
        let credential = self
            .read()?
            .remove(CREDENTIAL_KEY)
            .and_then(|v| v.as_str().map(str::to_owned));
        Ok(credential)
    }

    pub fn save_credential(&self, credential: &str) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(CREDENTIAL_KEY.to_string(), Value::String(credential.to_string()));
        self.write(&entries)
    }

    pub fn clear_credential(&self) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            debug!("Removing settings file {}", self.path.display());
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        self.write(&entries)
    }

    fn read(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => {
                warn!("Settings file {} is not a JSON object; ignoring it", self.path.display());
                Ok(Map::new())
            }
            Err(e) => {
                warn!("Settings file {} is unreadable ({}); ignoring it", self.path.display(), e);
                Ok(Map::new())
            }
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Replaced atomically: written beside the target, then renamed.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
