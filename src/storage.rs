use crate::config;
use crate::error::{Error, Result};
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Whole-blob key-value persistence backend.
///
/// Blobs are written in full after every mutation; there is no atomicity
/// across keys (a crash between two saves can leave them inconsistent).
pub trait BlobStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// File-backed blob store: one `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the default store under the platform data dir.
    pub fn new() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .ok_or_else(|| Error::storage("failed to get local data dir"))?
            .join(config::APP_DIR_NAME);
        Self::at(dir)
    }

    /// Open a store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        debug!("loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(bytes))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, bytes)?;
        debug!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

/// In-memory blob store for tests and previews.
///
/// Cloning shares the underlying map, so a clone held by a test observes
/// everything the store under test writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blobs: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.borrow_mut().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
