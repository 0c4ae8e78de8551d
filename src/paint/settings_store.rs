use crate::paint::history::{HistoryEntry, StrokeHistory};
use crate::paint::settings::PaintSettings;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const STATE_KEY: &str = "statev2";
pub const LINES_KEY: &str = "linesv2";
pub const STATE_DIR_NAME: &str = "drip_paint_state";

/// String key-value storage for persisted painting state.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store placed next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe_path = std::env::current_exe().context("resolve current executable")?;
        Ok(Self::new(state_dir_from_exe_path(&exe_path)?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("read state file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create state folder {}", self.dir.display()))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .with_context(|| format!("write state file {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

pub fn state_dir_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(STATE_DIR_NAME))
}

/// Loads the configuration record. A missing record yields defaults; an
/// unreadable or corrupt one is logged and also yields defaults.
pub fn load_settings(store: &dyn StateStore) -> PaintSettings {
    load_or_default(store, STATE_KEY)
}

/// Loads the committed strokes and clamps the stored history cursor to them.
pub fn load_history(store: &dyn StateStore, step: usize) -> StrokeHistory {
    let entries: Vec<HistoryEntry> = load_or_default(store, LINES_KEY);
    if step > entries.len() {
        tracing::warn!(
            step,
            entries = entries.len(),
            "stored history step is past the end; clamping"
        );
    }
    StrokeHistory::from_entries(entries, step)
}

pub fn save_settings(store: &mut dyn StateStore, settings: &PaintSettings) -> Result<()> {
    let json = serde_json::to_string(settings).context("serialize paint settings")?;
    store
        .set(STATE_KEY, &json)
        .with_context(|| format!("store {STATE_KEY}"))
}

pub fn save_history(store: &mut dyn StateStore, history: &StrokeHistory) -> Result<()> {
    let json = serde_json::to_string(history.entries()).context("serialize stroke history")?;
    store
        .set(LINES_KEY, &json)
        .with_context(|| format!("store {LINES_KEY}"))
}

fn load_or_default<T: DeserializeOwned + Default>(store: &dyn StateStore, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(key, error = ?err, "failed to read persisted state; using defaults");
            return T::default();
        }
    };
    // A literal `null` counts as an absent record.
    if raw.trim() == "null" {
        return T::default();
    }
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "persisted state is corrupt; using defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::model::{Color, Point};
    use crate::paint::stroke::Stroke;
    use tempfile::tempdir;

    #[test]
    fn state_dir_is_sibling_of_exe() {
        let exe = Path::new("/tmp/app/bin/drip_paint");
        let dir = state_dir_from_exe_path(exe).expect("state dir");
        assert_eq!(dir, Path::new("/tmp/app/bin").join(STATE_DIR_NAME));
    }

    #[test]
    fn missing_keys_load_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_settings(&store), PaintSettings::default());
        assert!(load_history(&store, 4).is_empty());
    }

    #[test]
    fn corrupt_record_loads_defaults() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, "{not json").unwrap();
        store.set(LINES_KEY, "[{\"color\":12}]").unwrap();
        assert_eq!(load_settings(&store), PaintSettings::default());
        assert!(load_history(&store, 1).is_empty());
    }

    #[test]
    fn history_cursor_is_clamped_on_load() {
        let mut store = MemoryStore::new();
        let mut history = StrokeHistory::default();
        let mut stroke = Stroke::new();
        stroke.push(Point::new(1.0, 2.0), 3.0);
        history.commit(stroke, Color::BLACK);
        save_history(&mut store, &history).unwrap();

        let loaded = load_history(&store, 7);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.step(), 1);
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("nested"));
        let settings = PaintSettings {
            history_step: 0,
            brush_color: Color::rgb(200, 10, 10),
            ..PaintSettings::default()
        };
        save_settings(&mut store, &settings).expect("save settings");

        assert!(store.path_for(STATE_KEY).exists());
        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(load_settings(&reopened), settings);
    }

    #[test]
    fn empty_file_is_treated_as_missing() {
        let dir = tempdir().expect("temp dir");
        let store = FileStore::new(dir.path());
        std::fs::write(store.path_for(STATE_KEY), "  \n").unwrap();
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
        assert_eq!(load_settings(&store), PaintSettings::default());
    }

    #[test]
    fn null_record_loads_defaults() {
        let mut store = MemoryStore::new();
        store.set(LINES_KEY, "null").unwrap();
        assert!(load_history(&store, 0).is_empty());
    }
}
