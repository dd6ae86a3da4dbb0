use crate::catalog::manager::{Catalog, CatalogError};
use crate::catalog::schema::{DB_ATTRIBUTES_NAME, DB_TABLES_NAME, DB_TYPES_NAME};
use crate::catalog::types::{RawColumnInfo, TableId};
use crate::model::relation::{CatalogKind, CatalogRelation, Relation};
use crate::model::user_table::UserTable;
use crate::storage::buffer_manager::BufferManager;
use crate::storage::disk_manager::DiskManager;
use crate::storage::heap::HeapFile;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableManagerError {
    #[error("no table named {0}")]
    UnknownTable(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn catalog_kind_of(table_name: &str) -> Option<CatalogKind> {
    match table_name {
        DB_TABLES_NAME => Some(CatalogKind::Tables),
        DB_ATTRIBUTES_NAME => Some(CatalogKind::Attributes),
        DB_TYPES_NAME => Some(CatalogKind::Types),
        _ => None,
    }
}

/// Opens relations by name and caches the handles. User tables decode
/// through their column schema; the three system catalogs resolve to
/// catalog-typed relations so they scan through the same pipeline.
pub struct TableManager {
    catalog: Rc<RefCell<Catalog>>,
    bm: Rc<RefCell<BufferManager>>,
    dm: Rc<RefCell<DiskManager>>,
    cache: HashMap<String, Rc<RefCell<Relation>>>,
}

impl TableManager {
    pub fn new(
        catalog: Rc<RefCell<Catalog>>,
        bm: Rc<RefCell<BufferManager>>,
        dm: Rc<RefCell<DiskManager>>,
    ) -> Self {
        Self {
            catalog,
            bm,
            dm,
            cache: HashMap::new(),
        }
    }

    /// Looks a table up in the catalog and opens its heap, or returns
    /// the cached handle from an earlier open.
    pub fn open_table(&mut self, name: &str) -> Result<Rc<RefCell<Relation>>, TableManagerError> {
        if let Some(rel) = self.cache.get(name) {
            return Ok(rel.clone());
        }

        let catalog = self.catalog.borrow();
        let info = catalog
            .lookup_table(name)
            .ok_or_else(|| TableManagerError::UnknownTable(name.to_string()))?;
        let heap = HeapFile::open(
            self.bm.clone(),
            self.dm.clone(),
            info.heap_file_id,
            info.first_page_id,
        );

        let relation = match catalog_kind_of(name) {
            Some(kind) => Relation::Catalog(CatalogRelation::new(heap, kind)),
            None => {
                let columns = catalog.get_table_columns(info.table_id);
                Relation::User(UserTable::new(heap, columns, info.table_id))
            }
        };
        drop(catalog);

        let relation = Rc::new(RefCell::new(relation));
        self.cache.insert(name.to_string(), relation.clone());
        Ok(relation)
    }

    /// DDL pass-through to the catalog.
    pub fn create_table(
        &mut self,
        name: &str,
        columns: &[RawColumnInfo],
    ) -> Result<TableId, TableManagerError> {
        Ok(self.catalog.borrow_mut().create_table(name, columns)?)
    }
}
