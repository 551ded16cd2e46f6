use directories::ProjectDirs;
use parking_lot::Mutex;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Durable memory for the last committed main-ring index.
///
/// Reads happen once at ring construction, writes on every committed
/// selection. Write failures are logged by the implementation and never
/// surface to the ring.
pub trait SelectionStore: Send + Sync {
    fn read(&self) -> Option<usize>;
    fn write(&self, index: usize);
}

pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default() -> Result<Self, PersistError> {
        let proj_dirs =
            ProjectDirs::from("org", "rondel", "rondel").ok_or(PersistError::DataDirNotFound)?;
        let dir = proj_dirs.data_dir();
        fs_err::create_dir_all(dir)?;
        Ok(Self::new(dir.join("selection")))
    }
}

impl SelectionStore for FileSelectionStore {
    fn read(&self) -> Option<usize> {
        fs_err::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    fn write(&self, index: usize) {
        if let Err(e) = fs_err::write(&self.path, index.to_string()) {
            log::warn!("Failed to persist selection: {}", e);
        }
    }
}

/// Store for tests and embedders without a disk.
#[derive(Default)]
pub struct MemorySelectionStore {
    cell: Mutex<Option<usize>>,
}

impl MemorySelectionStore {
    pub fn with_index(index: usize) -> Self {
        Self {
            cell: Mutex::new(Some(index)),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn read(&self) -> Option<usize> {
        *self.cell.lock()
    }

    fn write(&self, index: usize) {
        *self.cell.lock() = Some(index);
    }
}
