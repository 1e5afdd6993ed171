// src/store/mod.rs

//! Session-scoped display counters.
//! Counters live in a string key/value `SessionStorage` under
//! `widgetic_count_{widgetId}`. Storage failures never reach the engine:
//! reads fail open to 0 and writes are dropped with a warning.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::error::{Result, WidgetError};

pub mod file;

pub use file::FileStorage;

/// Namespace prefix for per-widget counter keys
pub const COUNT_KEY_PREFIX: &str = "widgetic_count_";

/// String key/value storage scoped to one browsing session
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Storage key for a widget's display counter
pub fn count_key(widget_id: &str) -> String {
    format!("{}{}", COUNT_KEY_PREFIX, widget_id)
}

/// Per-widget "times shown" counters for the current session
#[derive(Clone)]
pub struct DisplayCountStore {
    storage: Arc<dyn SessionStorage>,
}

impl DisplayCountStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Times the widget was shown this session, 0 if unknown or unreadable
    pub fn get(&self, widget_id: &str) -> u32 {
        match self.storage.get_item(&count_key(widget_id)) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("Display count read failed for {}: {}", widget_id, e);
                0
            }
        }
    }

    pub fn set(&self, widget_id: &str, count: u32) {
        if let Err(e) = self.storage.set_item(&count_key(widget_id), &count.to_string()) {
            warn!("Display count write dropped for {}: {}", widget_id, e);
        }
    }
}

/// In-memory session storage. Clones share the same map, so two engines
/// built from clones behave like reloads of one page in one session.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a widget's counter as if an earlier page view had recorded it
    pub fn seed_count(&self, widget_id: &str, count: u32) -> Result<()> {
        self.set_item(&count_key(widget_id), &count.to_string())
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| WidgetError::persistence("session storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| WidgetError::persistence("session storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
