//! Persistent sample cache.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Parallel minute-of-day / value sequences of one station and day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    pub timestamps: Vec<u32>,
    pub values: Vec<f64>,
}

impl SampleSeries {
    pub fn push(&mut self, minute_of_day: u32, value: f64) {
        self.timestamps.push(minute_of_day);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len().min(self.timestamps.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key of the entry for `station` fetched on `date`.
pub fn cache_key(station: &str, date: NaiveDate) -> String {
    format!("{station}_{}", date.format("%Y-%m-%d"))
}

pub trait SampleStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<SampleSeries>, Error>;
    fn store(&self, key: &str, series: &SampleSeries) -> Result<(), Error>;
}

fn poisoned<T>(_: T) -> Error {
    Error::CacheError("cache lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemorySampleStore {
    entries: Mutex<HashMap<String, SampleSeries>>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleStore for MemorySampleStore {
    fn load(&self, key: &str) -> Result<Option<SampleSeries>, Error> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, series: &SampleSeries) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), series.clone());
        Ok(())
    }
}

/// Whole-file JSON cache.
///
/// Every write rereads the file, replaces one entry and rewrites the file
/// through a temporary sibling and a rename. Writes from one process are
/// serialized; entries are never pruned.
#[derive(Debug)]
pub struct FileSampleStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or corrupt file counts as an empty cache. Any other read
    /// failure is an error so that a rewrite cannot drop existing entries.
    fn read_all(&self) -> Result<BTreeMap<String, SampleSeries>, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(Error::CacheError(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Sample cache {} is corrupt: {e}", self.path.display());
            BTreeMap::new()
        }))
    }
}

impl SampleStore for FileSampleStore {
    fn load(&self, key: &str) -> Result<Option<SampleSeries>, Error> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn store(&self, key: &str, series: &SampleSeries) -> Result<(), Error> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), series.clone());

        let text = serde_json::to_string(&entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| Error::CacheError(format!("{}: {e}", self.path.display())))?;
        debug!(
            "Stored {} samples under '{key}' in {}",
            series.len(),
            self.path.display()
        );
        Ok(())
    }
}
