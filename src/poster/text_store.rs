use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CUSTOM_TEXT_KEY: &str = "bauhaus-custom-text";
pub const TEXT_STORE_FILE_NAME: &str = "poster_text.json";

/// Small string key-value store for user preferences.
pub trait TextStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryTextStore {
    values: HashMap<String, String>,
}

impl MemoryTextStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl TextStore for MemoryTextStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk. Missing or empty files read as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonTextStore {
    path: PathBuf,
}

pub fn store_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(TEXT_STORE_FILE_NAME))
}

impl JsonTextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn beside_executable() -> Result<Self> {
        let exe_path = std::env::current_exe().context("resolve current executable")?;
        Ok(Self::new(store_path_from_exe_path(&exe_path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read text store {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize text store {}", self.path.display()))
    }
}

impl TextStore for JsonTextStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.read_all()?;
        Ok(values.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create text store folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&values).context("serialize text store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write text store {}", self.path.display()))
    }
}
