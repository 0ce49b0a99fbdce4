//! Persistent on-disk tile store.
//!
//! Raster bytes and their JSON metadata sidecars live in two parallel trees
//! under a single root directory:
//!
//! ```text
//! <root>/raster/<zoom>/<x>/<y>.png
//! <root>/meta/<zoom>/<x>/<y>.json
//! ```
//!
//! Every write goes to a `.part` file beside its final path and is then renamed
//! into place, so readers only ever see complete files. All operations are
//! serialized through one store-wide lock.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::meta::CacheMeta;
use crate::coord::TileId;

/// Default raster subdirectory name.
pub const DEFAULT_RASTER_DIR: &str = "raster";

/// Default metadata subdirectory name.
pub const DEFAULT_META_DIR: &str = "meta";

/// Suffix appended to in-flight temporary files.
const PART_SUFFIX: &str = ".part";

/// Errors from disk store construction and writes.
#[derive(Debug, Error)]
pub enum DiskError {
    /// The configured root directory is empty.
    #[error("cache root directory must be set")]
    EmptyRoot,

    /// Failed to create a parent directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to write a temporary file.
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// Failed to move a temporary file into place.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to delete a cached file.
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Disk store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskConfig {
    /// Root directory owned by the store.
    pub root: PathBuf,
    /// Subdirectory holding raster files.
    pub raster_dir: String,
    /// Subdirectory holding metadata sidecars.
    pub meta_dir: String,
}

impl DiskConfig {
    /// Creates a configuration with the default subdirectory names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            raster_dir: DEFAULT_RASTER_DIR.to_string(),
            meta_dir: DEFAULT_META_DIR.to_string(),
        }
    }
}

/// Totals for the files currently held by a [`DiskStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub tiles: u64,
    pub raster_bytes: u64,
    pub meta_files: u64,
    pub meta_bytes: u64,
}

/// Thread-safe persistent store for raster tiles and their metadata.
pub struct DiskStore {
    config: DiskConfig,
    lock: Mutex<()>,
}

impl DiskStore {
    /// Creates a store rooted at `config.root`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(config: DiskConfig) -> Result<Self, DiskError> {
        if config.root.as_os_str().is_empty() {
            return Err(DiskError::EmptyRoot);
        }
        Ok(Self {
            config,
            lock: Mutex::new(()),
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &DiskConfig {
        &self.config
    }

    /// Final location of a tile's raster file.
    pub fn raster_path(&self, id: &TileId) -> PathBuf {
        self.config
            .root
            .join(&self.config.raster_dir)
            .join(id.relative_path())
            .with_extension("png")
    }

    /// Final location of a tile's metadata sidecar.
    pub fn meta_path(&self, id: &TileId) -> PathBuf {
        self.config
            .root
            .join(&self.config.meta_dir)
            .join(id.relative_path())
            .with_extension("json")
    }

    /// Loads raster bytes.
    ///
    /// A missing file is a miss. Any other read failure is logged and also
    /// reported as a miss.
    pub fn load_raster(&self, id: &TileId) -> Option<Vec<u8>> {
        let _guard = self.lock.lock();
        read_or_miss(&self.raster_path(id), id)
    }

    /// Saves raster bytes, optionally together with metadata.
    ///
    /// The sidecar is written before the raster is renamed into place. A
    /// sidecar failure is logged and does not abort the raster save.
    pub fn save_raster(
        &self,
        id: &TileId,
        bytes: &[u8],
        meta: Option<&CacheMeta>,
    ) -> Result<(), DiskError> {
        let _guard = self.lock.lock();
        let path = self.raster_path(id);

        ensure_parent_dir(&path)?;
        let part = part_path(&path);
        write_file(&part, bytes)?;

        if let Some(meta) = meta {
            if let Err(e) = self.save_meta_locked(id, meta) {
                warn!(tile = %id, error = %e, "Failed to write tile metadata");
            }
        }

        commit(&part, &path)?;
        debug!(tile = %id, bytes = bytes.len(), "Saved raster");
        Ok(())
    }

    /// Loads the metadata sidecar.
    ///
    /// A missing sidecar is a miss; a malformed one yields default metadata.
    pub fn load_meta(&self, id: &TileId) -> Option<CacheMeta> {
        let _guard = self.lock.lock();
        read_or_miss(&self.meta_path(id), id)
            .map(|bytes| CacheMeta::from_json(&String::from_utf8_lossy(&bytes)))
    }

    /// Saves the metadata sidecar on its own.
    pub fn save_meta(&self, id: &TileId, meta: &CacheMeta) -> Result<(), DiskError> {
        let _guard = self.lock.lock();
        self.save_meta_locked(id, meta)
    }

    /// Returns true if a raster file is present. Metadata is not considered.
    pub fn exists(&self, id: &TileId) -> bool {
        let _guard = self.lock.lock();
        self.raster_path(id).is_file()
    }

    /// Deletes both raster and metadata files.
    ///
    /// Files that are already absent count as removed.
    pub fn remove(&self, id: &TileId) -> Result<(), DiskError> {
        let _guard = self.lock.lock();
        remove_if_present(&self.raster_path(id))?;
        remove_if_present(&self.meta_path(id))?;
        debug!(tile = %id, "Removed tile from disk");
        Ok(())
    }

    /// Recursively deletes the whole root directory.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn clear_all(&self) {
        let _guard = self.lock.lock();
        match fs::remove_dir_all(&self.config.root) {
            Ok(()) => info!(root = %self.config.root.display(), "Cleared disk cache"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                root = %self.config.root.display(),
                error = %e,
                "Failed to clear disk cache"
            ),
        }
    }

    /// Counts committed raster and metadata files and their sizes.
    ///
    /// In-progress `.part` files are skipped. Unreadable directories are
    /// skipped silently.
    pub fn usage(&self) -> DiskUsage {
        let _guard = self.lock.lock();
        let (tiles, raster_bytes) = tally(&self.config.root.join(&self.config.raster_dir), "png");
        let (meta_files, meta_bytes) = tally(&self.config.root.join(&self.config.meta_dir), "json");
        DiskUsage {
            tiles,
            raster_bytes,
            meta_files,
            meta_bytes,
        }
    }

    /// Writes the sidecar. Caller must hold the lock.
    fn save_meta_locked(&self, id: &TileId, meta: &CacheMeta) -> Result<(), DiskError> {
        let path = self.meta_path(id);
        ensure_parent_dir(&path)?;
        let part = part_path(&path);
        write_file(&part, meta.to_json().as_bytes())?;
        commit(&part, &path)
    }
}

fn read_or_miss(path: &Path, id: &TileId) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(tile = %id, path = %path.display(), error = %e, "Disk read failed, treating as miss");
            None
        }
    }
}

fn tally(dir: &Path, extension: &str) -> (u64, u64) {
    let Ok(entries) = fs::read_dir(dir) else {
        return (0, 0);
    };

    let mut count = 0;
    let mut bytes = 0;
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            let (c, b) = tally(&path, extension);
            count += c;
            bytes += b;
        } else if file_type.is_file() && path.extension().is_some_and(|e| e == extension) {
            count += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    (count, bytes)
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> Result<(), DiskError> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir).map_err(|source| DiskError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DiskError> {
    let write = || -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    };
    write().map_err(|source| {
        let _ = fs::remove_file(path);
        DiskError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn commit(part: &Path, path: &Path) -> Result<(), DiskError> {
    fs::rename(part, path).map_err(|source| {
        let _ = fs::remove_file(part);
        DiskError::Rename {
            from: part.to_path_buf(),
            to: path.to_path_buf(),
            source,
        }
    })
}

fn remove_if_present(path: &Path) -> Result<(), DiskError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DiskError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
