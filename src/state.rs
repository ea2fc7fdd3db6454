//! Expand/collapse state for the report sections.
//!
//! The record is a plain value owned by whoever drives the view. It is read
//! from and written to an injected [`StateStore`] under a string key. Reads
//! never fail from the caller's point of view: an absent, unreadable or
//! malformed record yields the fallback, and write failures are logged and
//! dropped.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StateError;

pub const DEFAULT_STATE_KEY: &str = "tableDiffExpanded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
#[value(rename_all = "kebab-case")]
pub enum SectionId {
    Schema,
    Rows,
    ColumnStats,
    SampleData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpandedSections {
    pub schema: bool,
    pub rows: bool,
    pub column_stats: bool,
    pub sample_data: bool,
}

impl Default for ExpandedSections {
    fn default() -> Self {
        Self {
            schema: true,
            rows: true,
            column_stats: false,
            sample_data: false,
        }
    }
}

impl ExpandedSections {
    pub fn is_expanded(&self, section: SectionId) -> bool {
        match section {
            SectionId::Schema => self.schema,
            SectionId::Rows => self.rows,
            SectionId::ColumnStats => self.column_stats,
            SectionId::SampleData => self.sample_data,
        }
    }

    /// Copy of the record with one section flipped.
    pub fn toggled(&self, section: SectionId) -> Self {
        let mut next = *self;
        let flag = match section {
            SectionId::Schema => &mut next.schema,
            SectionId::Rows => &mut next.rows,
            SectionId::ColumnStats => &mut next.column_stats,
            SectionId::SampleData => &mut next.sample_data,
        };
        *flag = !*flag;
        next
    }
}

/// Stored form; fields missing from an older record take the fallback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSections {
    schema: Option<bool>,
    rows: Option<bool>,
    column_stats: Option<bool>,
    sample_data: Option<bool>,
}

impl StoredSections {
    fn resolve(self, fallback: ExpandedSections) -> ExpandedSections {
        ExpandedSections {
            schema: self.schema.unwrap_or(fallback.schema),
            rows: self.rows.unwrap_or(fallback.rows),
            column_stats: self.column_stats.unwrap_or(fallback.column_stats),
            sample_data: self.sample_data.unwrap_or(fallback.sample_data),
        }
    }
}

/// Key-value persistence for small JSON records.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StateError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StateError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps every key in one JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_object(&self) -> Result<Map<String, Value>, StateError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(StateError::NotAnObject(self.path.clone())),
        }
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        Ok(self.read_object()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        let mut object = match self.read_object() {
            Ok(object) => object,
            Err(err) => {
                warn!(
                    "Discarding unreadable state file {:?}: {err}",
                    self.path
                );
                Map::new()
            }
        };
        object.insert(key.to_string(), value);
        let serialized = serde_json::to_string_pretty(&Value::Object(object))?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

/// Reads the section record, falling back on any failure.
pub fn load_expanded(
    store: &dyn StateStore,
    key: &str,
    fallback: ExpandedSections,
) -> ExpandedSections {
    let stored = match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("No stored section state under '{key}'");
            return fallback;
        }
        Err(err) => {
            warn!("Reading section state '{key}' failed: {err}");
            return fallback;
        }
    };
    match StoredSections::deserialize(&stored) {
        Ok(sections) => sections.resolve(fallback),
        Err(err) => {
            debug!("Ignoring malformed section state under '{key}': {err}");
            fallback
        }
    }
}

/// Persists the section record; failures are logged and dropped.
pub fn save_expanded(store: &mut dyn StateStore, key: &str, sections: &ExpandedSections) {
    let value = match serde_json::to_value(sections) {
        Ok(value) => value,
        Err(err) => {
            warn!("Serializing section state failed: {err}");
            return;
        }
    };
    if let Err(err) = store.set(key, value) {
        warn!("Writing section state '{key}' failed: {err}");
    }
}
