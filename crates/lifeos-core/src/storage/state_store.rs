//! Flat-file persistence for scheduler state.
//!
//! Scheduling math never touches the filesystem directly: callers hand a
//! [`StateStore`] to the session drivers, which load once and save after
//! each durable step.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Load/save interface for one piece of scheduler state.
pub trait StateStore {
    type State;

    /// Load the current state. Absent state yields the default value.
    fn load(&self) -> Result<Self::State>;

    /// Persist `state`, replacing whatever was stored before.
    fn save(&self, state: &Self::State) -> Result<()>;
}

/// JSON file store.
///
/// A missing or malformed file loads as `T::default()`; corruption is
/// logged rather than surfaced so one bad write never blocks a session.
/// Saves go through a sibling temp file and a rename.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _state: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> StateStore for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    type State = T;

    fn load(&self) -> Result<T> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed state file, starting from empty state"
                );
                Ok(T::default())
            }
        }
    }

    fn save(&self, state: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(|source| CoreError::StateWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| CoreError::StateWrite {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    state: RefCell<T>,
    saves: RefCell<usize>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: RefCell::new(state),
            saves: RefCell::new(0),
        }
    }

    /// Snapshot of the last saved state.
    pub fn snapshot(&self) -> T {
        self.state.borrow().clone()
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl<T: Clone> StateStore for MemoryStore<T> {
    type State = T;

    fn load(&self) -> Result<T> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &T) -> Result<()> {
        *self.state.borrow_mut() = state.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
