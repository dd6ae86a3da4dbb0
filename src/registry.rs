//! Maps database names onto disk managers backed by `<data_dir>/<name>.db`.

use crate::storage::disk_manager::{DiskError, DiskManager};
use log::info;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

const DB_FILE_EXTENSION: &str = "db";

/// Process configuration handed to the registry at startup.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub data_dir: PathBuf,
}

impl DbConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("database {0} already exists")]
    AlreadyExists(String),
    #[error("no database named {0}")]
    NotFound(String),
    #[error(transparent)]
    Disk(#[from] DiskError),
    #[error("i/o failure in data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// One disk manager per known database file. `init` discovers existing
/// files; create/open/delete keep the map and the filesystem in step.
/// Duplicate creates and missing opens/deletes are ordinary errors, not
/// fatal.
pub struct DatabaseRegistry {
    data_dir: PathBuf,
    databases: HashMap<String, Rc<RefCell<DiskManager>>>,
}

impl DatabaseRegistry {
    /// Creates the data directory if needed (idempotent) and scans it
    /// for `*.db` files, opening a disk manager for each.
    pub fn init(config: &DbConfig) -> Result<Self, RegistryError> {
        fs::create_dir_all(&config.data_dir)?;

        let mut databases = HashMap::new();
        for entry in fs::read_dir(&config.data_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(DB_FILE_EXTENSION)
            {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let dm = Rc::new(RefCell::new(DiskManager::open(&path)?));
            databases.insert(name.to_string(), dm);
        }

        info!(
            "registry initialised with {} database(s) in {}",
            databases.len(),
            config.data_dir.display()
        );
        Ok(Self {
            data_dir: config.data_dir.clone(),
            databases,
        })
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{DB_FILE_EXTENSION}"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.databases.keys().cloned().collect();
        names.sort();
        names
    }

    /// Creates a new database file. Fails if the name is already known
    /// or the file already exists on disk.
    pub fn create_database(
        &mut self,
        name: &str,
    ) -> Result<Rc<RefCell<DiskManager>>, RegistryError> {
        let path = self.path_of(name);
        if self.databases.contains_key(name) || path.exists() {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        let dm = Rc::new(RefCell::new(DiskManager::open(&path)?));
        self.databases.insert(name.to_string(), dm.clone());
        info!("created database {name}");
        Ok(dm)
    }

    /// Returns the disk manager for `name`, opening the file if it
    /// exists but was not seen at `init` time.
    pub fn open_database(&mut self, name: &str) -> Result<Rc<RefCell<DiskManager>>, RegistryError> {
        if let Some(dm) = self.databases.get(name) {
            return Ok(dm.clone());
        }

        let path = self.path_of(name);
        if !path.exists() {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        let dm = Rc::new(RefCell::new(DiskManager::open(&path)?));
        self.databases.insert(name.to_string(), dm.clone());
        Ok(dm)
    }

    /// Drops the database from the map and removes its file.
    pub fn delete_database(&mut self, name: &str) -> Result<(), RegistryError> {
        let known = self.databases.remove(name).is_some();
        let path = self.path_of(name);
        if !known && !path.exists() {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        if path.exists() {
            fs::remove_file(&path)?;
        }
        info!("deleted database {name}");
        Ok(())
    }
}
