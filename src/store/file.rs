// src/store/file.rs
// JSON-file session storage so counters survive CLI restarts within a session

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SessionStorage;
use crate::error::{Result, WidgetError};

/// One JSON object file per session: `<dir>/<session>.json`
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write within this process
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>, session_id: &str) -> Result<Self> {
        let session = sanitize_session_id(session_id);
        if session.is_empty() {
            return Err(WidgetError::Config(format!(
                "invalid session id: {:?}",
                session_id
            )));
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        Ok(Self {
            path: dir.join(format!("{}.json", session)),
            guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

fn sanitize_session_id(session_id: &str) -> String {
    session_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| WidgetError::persistence("file storage lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| WidgetError::persistence("file storage lock poisoned"))?;
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&items)?)?;
        Ok(())
    }
}
