use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use shared::ImageExtension;

/// Directory holding uploads while they are being classified.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under a fresh random key. The caller-supplied filename
    /// never reaches the filesystem.
    pub fn persist(&self, bytes: &[u8], extension: ImageExtension) -> io::Result<ScratchFile> {
        let key = Uuid::new_v4();
        let path = self.root.join(format!("{}.{}", key, extension));
        fs::write(&path, bytes)?;
        log::debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(ScratchFile { key, path })
    }
}

/// A persisted upload. Removed from disk when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    key: Uuid,
    path: PathBuf,
}

impl ScratchFile {
    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
        }
    }
}
