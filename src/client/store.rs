//! Durable key-value slots for client-side session persistence.
//!
//! Writes are synchronous: when `save` returns, the value is on disk.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Application directory name under the platform data dir.
const APP_DIR: &str = "tripgate";

/// File holding the key-value map.
const STORE_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum DurableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine a local data directory")]
    NoDataDir,
}

/// Persistent string slots that survive process restarts.
pub trait DurableStore {
    fn load(&self, key: &str) -> Result<Option<String>, DurableError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), DurableError>;
    fn remove(&mut self, key: &str) -> Result<(), DurableError>;
}

/// JSON map on disk, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/tripgate/session.json`
    pub fn default_location() -> Result<Self, DurableError> {
        let base = dirs::data_local_dir().ok_or(DurableError::NoDataDir)?;
        Ok(Self::new(base.join(APP_DIR).join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, DurableError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A corrupt file holds no usable session; the next write replaces it
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(HashMap::new())
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), DurableError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let contents = serde_json::to_vec_pretty(map)?;
        {
            let mut file = open_private(&temp_path)?;
            file.write_all(&contents)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Create (or truncate) a file readable only by the current user.
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

impl DurableStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, DurableError> {
        Ok(self.read_map()?.remove(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), DurableError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), DurableError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Volatile store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, DurableError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), DurableError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DurableError> {
        self.slots.remove(key);
        Ok(())
    }
}
