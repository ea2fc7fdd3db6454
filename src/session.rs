//! Drives the panel for a host: model selection, payload caching, host
//! events and section state.
//!
//! A *model* is one unit of comparison (typically a file). The session picks
//! one, fetches its payload through a [`DiffSource`] once, and serves the
//! rendered tree until a host event says the data may be stale. Fetch failures
//! are shown with their message and are not retried until the next event.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ViewConfig,
    error::{FetchError, Rejection},
    payload::{DiffPayload, validate},
    report::{DisplayTree, render},
    state::{ExpandedSections, SectionId, StateStore, load_expanded, save_expanded},
};

pub const MODELS_FILE: &str = "models.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub full_path: PathBuf,
}

/// Supplies the model list and per-model payloads.
pub trait DiffSource {
    fn models(&self) -> Result<Vec<Model>, FetchError>;
    fn fetch(&self, model: &str) -> Result<Value, FetchError>;
}

/// Reads `models.json` and `<model>.json` payloads from one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json(&self, path: &Path) -> Result<Value, FetchError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| FetchError::Message(format!("Reading {path:?} failed: {err}")))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl DiffSource for DirectorySource {
    fn models(&self) -> Result<Vec<Model>, FetchError> {
        let raw = self.read_json(&self.root.join(MODELS_FILE))?;
        Ok(serde_json::from_value(raw)?)
    }

    fn fetch(&self, model: &str) -> Result<Value, FetchError> {
        self.read_json(&self.root.join(format!("{model}.json")))
    }
}

/// Notifications the host sends about the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ChangeFocusedFile(PathBuf),
    SavedFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelView {
    Loading,
    Error { message: String },
    Ready { tree: DisplayTree },
}

type FetchOutcome = Result<Result<DiffPayload, Rejection>, String>;

pub struct PanelSession<S, T> {
    source: S,
    store: T,
    config: ViewConfig,
    models: Result<Vec<Model>, String>,
    selected: Option<String>,
    cached: Option<FetchOutcome>,
    expanded: ExpandedSections,
}

impl<S: DiffSource, T: StateStore> PanelSession<S, T> {
    pub fn new(source: S, store: T, config: ViewConfig) -> Self {
        let expanded = load_expanded(&store, &config.state_key, config.default_expanded);
        Self {
            source,
            store,
            config,
            models: Ok(Vec::new()),
            selected: None,
            cached: None,
            expanded,
        }
    }

    /// Loads the model list and picks the model for `active_file`, or the
    /// first model when nothing matches.
    pub fn initialize(&mut self, active_file: Option<&Path>) {
        let models = match self.source.models() {
            Ok(models) => models,
            Err(err) => {
                warn!("Loading models failed: {err}");
                self.models = Err(err.to_string());
                return;
            }
        };
        if models.is_empty() {
            self.models = Err("Models data is not in the expected format".to_string());
            return;
        }
        let selected = active_file
            .and_then(|path| find_model(&models, path))
            .unwrap_or(&models[0])
            .name
            .clone();
        info!("Selected model '{selected}' from {} model(s)", models.len());
        self.models = Ok(models);
        self.select(selected);
    }

    pub fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::ChangeFocusedFile(path) => {
                let matched = self
                    .models
                    .as_ref()
                    .ok()
                    .and_then(|models| find_model(models, path))
                    .map(|model| model.name.clone());
                match matched {
                    Some(name) => self.select(name),
                    None => debug!("Focused file {path:?} has no model; keeping selection"),
                }
            }
            HostEvent::SavedFile(path) => {
                debug!("File {path:?} saved; dropping cached payload");
                self.cached = None;
            }
        }
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn expanded(&self) -> &ExpandedSections {
        &self.expanded
    }

    /// Flips one section and persists the new record.
    pub fn toggle(&mut self, section: SectionId) {
        self.expanded = self.expanded.toggled(section);
        save_expanded(&mut self.store, &self.config.state_key, &self.expanded);
    }

    /// Current view, fetching the selected model's payload if it is not cached.
    pub fn view(&mut self) -> PanelView {
        if let Err(message) = &self.models {
            return PanelView::Error {
                message: message.clone(),
            };
        }
        let Some(model) = self.selected.clone() else {
            return PanelView::Loading;
        };
        let outcome = self.cached.get_or_insert_with(|| {
            info!("Fetching table diff for model '{model}'");
            self.source
                .fetch(&model)
                .map(|raw| validate(Some(&raw)))
                .map_err(|err| err.to_string())
        });
        match outcome {
            Ok(payload) => PanelView::Ready {
                tree: render(payload, &self.expanded, &self.config),
            },
            Err(message) => PanelView::Error {
                message: message.clone(),
            },
        }
    }

    fn select(&mut self, name: String) {
        if self.selected.as_deref() != Some(name.as_str()) {
            debug!("Switching to model '{name}'");
            self.selected = Some(name);
            self.cached = None;
        }
    }
}

fn find_model<'a>(models: &'a [Model], path: &Path) -> Option<&'a Model> {
    models
        .iter()
        .find(|model| same_file(&model.full_path, path))
}

fn same_file(left: &Path, right: &Path) -> bool {
    if left == right {
        return true;
    }
    match (fs::canonicalize(left), fs::canonicalize(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
