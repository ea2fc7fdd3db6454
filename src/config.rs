use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    format::{HEADER_DISPLAY_WIDTH, VALUE_DISPLAY_WIDTH},
    state::{DEFAULT_STATE_KEY, ExpandedSections},
};

pub const DEFAULT_SAMPLE_ROW_LIMIT: usize = 10;

/// Presentation settings, optionally loaded from a YAML file. Missing keys keep
/// their built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Key the section state is stored under.
    pub state_key: String,
    /// Rows shown per sample table.
    pub sample_row_limit: usize,
    pub value_width: usize,
    pub header_width: usize,
    /// Section state used when nothing valid is stored.
    pub default_expanded: ExpandedSections,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_string(),
            sample_row_limit: DEFAULT_SAMPLE_ROW_LIMIT,
            value_width: VALUE_DISPLAY_WIDTH,
            header_width: HEADER_DISPLAY_WIDTH,
            default_expanded: ExpandedSections::default(),
        }
    }
}

impl ViewConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&contents).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
