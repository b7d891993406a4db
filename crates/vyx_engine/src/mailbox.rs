//! Single-slot, read-once store handing a successful payload to the results
//! view.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;
use vyx_logging::{vyx_debug, vyx_warn};

/// The one key the slot lives under.
pub const RESULT_KEY: &str = "vyx_content_result";

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("state directory {path:?} is unusable: {message}")]
    StateDir { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("stored result is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait Mailbox: Send + Sync {
    /// Stores `payload`, replacing any unread one.
    fn deposit(&self, payload: &Value) -> Result<(), MailboxError>;

    /// Removes and returns the stored payload. A second call returns `None`.
    fn take(&self) -> Result<Option<Value>, MailboxError>;
}

/// Process-scoped slot.
#[derive(Debug, Default)]
pub struct MemoryMailbox {
    slot: Mutex<Option<String>>,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mailbox for MemoryMailbox {
    fn deposit(&self, payload: &Value) -> Result<(), MailboxError> {
        let serialized = serde_json::to_string(payload)?;
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(serialized).is_some() {
            vyx_debug!("mailbox: replaced unread result");
        }
        Ok(())
    }

    fn take(&self) -> Result<Option<Value>, MailboxError> {
        let stored = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match stored {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

/// Slot kept as `<dir>/vyx_content_result.json`, so a later `vyx results`
/// invocation can read it. Writes go through a temp file in the same
/// directory and a rename, so a reader never sees half a payload.
#[derive(Debug, Clone)]
pub struct FileMailbox {
    dir: PathBuf,
    path: PathBuf,
}

impl FileMailbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(format!("{RESULT_KEY}.json"));
        Self { dir, path }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the state directory if needed and rejects a non-directory.
    pub fn prepare(&self) -> Result<(), MailboxError> {
        let unusable = |message: String| MailboxError::StateDir {
            path: self.dir.clone(),
            message,
        };
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(unusable("not a directory".into())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|err| unusable(err.to_string()))
            }
            Err(err) => Err(unusable(err.to_string())),
        }
    }
}

impl Mailbox for FileMailbox {
    fn deposit(&self, payload: &Value) -> Result<(), MailboxError> {
        self.prepare()?;
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut staged, payload)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|err| MailboxError::Io(err.error))?;
        vyx_debug!("mailbox: stored result at {:?}", self.path);
        Ok(())
    }

    fn take(&self) -> Result<Option<Value>, MailboxError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // Evict before parsing so a corrupt slot is not read twice either.
        fs::remove_file(&self.path)?;
        serde_json::from_str(&text).map(Some).map_err(|err| {
            vyx_warn!("mailbox: discarded unreadable result: {}", err);
            err.into()
        })
    }
}
