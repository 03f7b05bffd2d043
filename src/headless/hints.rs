//! [`PropertyPublisher`] backed by a JSON file.
//!
//! The whole hint set lives in one object keyed by hint name:
//!
//! ```json
//! {
//!   "NumberOfDesktops": { "Cardinal": 4 },
//!   "DesktopNames": { "Strings": ["web", "code"] },
//!   "Workarea": { "Integers": [0, 24, 1920, 1056] }
//! }
//! ```
//!
//! The file is re-read on every `get` so edits made by other programs are
//! seen, and rewritten on every `set`/`erase`.  Keys this crate does not
//! know are carried through untouched.  A file that is not a JSON object
//! at all is replaced on the next write.

use crate::hints::{Hint, HintValue, PropertyPublisher};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type RawHints = BTreeMap<String, Value>;

/// File-backed hint storage.
pub struct JsonHintStore {
    path: PathBuf,
}

/// Errors produced by the JSON hint store.
#[derive(Debug, thiserror::Error)]
pub enum HintStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsonHintStore {
    /// Store hints in `path`.  The file and its directory are created on
    /// the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored hint this crate understands.  A missing file is an
    /// empty set; unknown keys and malformed values are skipped.
    pub fn load(&self) -> Result<BTreeMap<Hint, HintValue>, HintStoreError> {
        Ok(self
            .read_raw()?
            .into_iter()
            .filter_map(|(key, value)| {
                let hint: Hint = serde_json::from_value(Value::String(key)).ok()?;
                let value: HintValue = serde_json::from_value(value).ok()?;
                Some((hint, value))
            })
            .collect())
    }

    fn read_raw(&self) -> Result<RawHints, HintStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(RawHints::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RawHints::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// The stored object, or an empty one if the file cannot be parsed.
    fn read_for_update(&self) -> Result<RawHints, HintStoreError> {
        match self.read_raw() {
            Err(HintStoreError::Json(e)) => {
                warn!("replacing unreadable hint file {}: {}", self.path.display(), e);
                Ok(RawHints::new())
            }
            other => other,
        }
    }

    fn save(&self, hints: &RawHints) -> Result<(), HintStoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        // Readers never see a partial file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(hints)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PropertyPublisher for JsonHintStore {
    type Error = HintStoreError;

    fn set(&self, hint: Hint, value: HintValue) -> Result<(), HintStoreError> {
        let mut hints = self.read_for_update()?;
        debug!("{} = {:?}", hint, value);
        hints.insert(hint.to_string(), serde_json::to_value(value)?);
        self.save(&hints)
    }

    fn get(&self, hint: Hint) -> Result<Option<HintValue>, HintStoreError> {
        let Some(value) = self.read_raw()?.remove(&hint.to_string()) else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("ignoring malformed {}: {}", hint, e);
                Ok(None)
            }
        }
    }

    fn erase(&self, hint: Hint) -> Result<(), HintStoreError> {
        let mut hints = self.read_for_update()?;
        if hints.remove(&hint.to_string()).is_some() {
            debug!("{} erased", hint);
            self.save(&hints)?;
        }
        Ok(())
    }
}
