use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::Snapshot;

pub const JSON_FILE_NAME: &str = "database.json";

/// Where a [`Snapshot`] lives between operations.
///
/// Every call moves the whole snapshot. Implementations do no locking of
/// their own; `Database` serializes access.
pub trait Persistence: Send + Sync {
    /// Create the backing medium holding an empty snapshot if it is absent.
    fn ensure_exists(&self) -> Result<()>;

    fn load(&self) -> Result<Snapshot>;

    /// Overwrite the stored snapshot in full. Not crash-atomic.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Discard everything and store an empty snapshot.
    fn reset(&self) -> Result<()> {
        self.save(&Snapshot::default())
    }

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Snapshot stored as one JSON document at `{dir}/database.json`.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(JSON_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        info!("Database file {} does not exist, creating", self.path.display());
        self.save(&Snapshot::default())
    }

    fn load(&self) -> Result<Snapshot> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
