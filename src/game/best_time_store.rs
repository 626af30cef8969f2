use log::{info, warn};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

pub const BEST_TIME_KEY: &str = "phone_puzzle_best_time";
const APP_DIR: &str = "phone-unlock";
const STORE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store at {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

/// Durable home of the single best-time scalar.
pub trait BestTimeStore {
    /// The stored best time, if any. Stored values that are not positive integers
    /// count as absent.
    fn load(&self) -> Result<Option<u32>, StoreError>;

    fn save(&mut self, seconds: u32) -> Result<(), StoreError>;
}

fn parse_best_time(value: &Value) -> Option<u32> {
    let seconds = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(seconds).ok().filter(|&s| s > 0)
}

/// Key-value JSON file, one object holding every key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `phone-unlock/storage.json` under the platform data directory, if there is one.
    pub fn in_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR).join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject(self.path.clone())),
        }
    }
}

impl BestTimeStore for JsonFileStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        let map = self.read_map()?;
        let best = map.get(BEST_TIME_KEY).and_then(parse_best_time);
        if best.is_none() && map.contains_key(BEST_TIME_KEY) {
            warn!(target: "best_time", "Ignoring unusable best time in {}", self.path.display());
        }
        Ok(best)
    }

    fn save(&mut self, seconds: u32) -> Result<(), StoreError> {
        // keep whatever else lives in the file
        let mut map = self.read_map()?;
        map.insert(BEST_TIME_KEY.to_string(), Value::from(seconds));

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(map))?)?;
        info!(target: "best_time", "Saved best time {}s to {}", seconds, self.path.display());
        Ok(())
    }
}

/// In-memory store; clones share the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Rc<Cell<Option<u32>>>,
}

impl MemoryStore {
    pub fn with_best(seconds: u32) -> Self {
        Self {
            best: Rc::new(Cell::new(Some(seconds))),
        }
    }

    pub fn best(&self) -> Option<u32> {
        self.best.get()
    }
}

impl BestTimeStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        Ok(self.best.get().filter(|&s| s > 0))
    }

    fn save(&mut self, seconds: u32) -> Result<(), StoreError> {
        self.best.set(Some(seconds));
        Ok(())
    }
}
