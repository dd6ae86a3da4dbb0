//! Per-database wiring: disk manager → buffer pool → catalog → table
//! manager. This is the programmatic entry point for embedding the
//! engine; the registry hands out disk managers for named databases and
//! [`Database::with_disk_manager`] assembles the rest on top.

use crate::catalog::manager::{Catalog, CatalogError};
use crate::constants::storage::BUFFER_POOL_SIZE;
use crate::exec::executor::Executor;
use crate::model::table_manager::TableManager;
use crate::plan::physical::{PlanError, PlanningContext, build};
use crate::plan::LogicalPlan;
use crate::storage::buffer_manager::BufferManager;
use crate::storage::clock::ClockPolicy;
use crate::storage::disk_manager::{DiskError, DiskManager};
use crate::value::Tuple;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Disk(#[from] DiskError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One open database: shared storage plumbing plus an initialised
/// catalog and a table manager over it.
pub struct Database {
    dm: Rc<RefCell<DiskManager>>,
    bm: Rc<RefCell<BufferManager>>,
    catalog: Rc<RefCell<Catalog>>,
    table_manager: TableManager,
}

impl Database {
    /// Opens (bootstrapping if fresh) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let dm = Rc::new(RefCell::new(DiskManager::open(path)?));
        Self::with_disk_manager(dm)
    }

    /// Assembles an engine on top of an externally managed disk manager
    /// (typically one handed out by the registry).
    pub fn with_disk_manager(dm: Rc<RefCell<DiskManager>>) -> Result<Self, DbError> {
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            BUFFER_POOL_SIZE,
            Box::new(ClockPolicy::new(BUFFER_POOL_SIZE)),
        )));

        let mut catalog = Catalog::new(bm.clone(), dm.clone());
        catalog.init()?;
        let catalog = Rc::new(RefCell::new(catalog));

        let table_manager = TableManager::new(catalog.clone(), bm.clone(), dm.clone());
        Ok(Self {
            dm,
            bm,
            catalog,
            table_manager,
        })
    }

    pub fn catalog(&self) -> Rc<RefCell<Catalog>> {
        self.catalog.clone()
    }

    pub fn table_manager(&mut self) -> &mut TableManager {
        &mut self.table_manager
    }

    pub fn disk_manager(&self) -> Rc<RefCell<DiskManager>> {
        self.dm.clone()
    }

    pub fn buffer_manager(&self) -> Rc<RefCell<BufferManager>> {
        self.bm.clone()
    }

    /// Plans and runs `plan`, materialising the result.
    pub fn run(&mut self, plan: &LogicalPlan) -> Result<Vec<Tuple>, PlanError> {
        let mut ctx = PlanningContext::new(&mut self.table_manager);
        let op = build(plan, &mut ctx)?;
        Ok(Executor::new(op).execute_and_collect())
    }

    /// Writes every buffered dirty page through to the file.
    pub fn flush(&self) {
        self.bm.borrow_mut().flush_all();
    }
}
