use crate::catalog::codec::CatalogRow;
use crate::catalog::schema::{
    DB_ATTRIBUTES_FILE_ID, DB_ATTRIBUTES_NAME, DB_ATTRIBUTES_ROOT_PAGE_ID,
    DB_ATTRIBUTES_TABLE_ID, DB_HEADER_PAGE_ID, DB_TABLES_FILE_ID, DB_TABLES_NAME,
    DB_TABLES_ROOT_PAGE_ID, DB_TABLES_TABLE_ID, DB_TYPES_FILE_ID, DB_TYPES_NAME,
    DB_TYPES_ROOT_PAGE_ID, DB_TYPES_TABLE_ID, INT_SIZE, INT_TYPE_ID, TEXT_SIZE, TEXT_TYPE_ID,
};
use crate::catalog::table::CatalogTable;
use crate::catalog::types::{ColumnInfo, RawColumnInfo, TableId, TableInfo, TypeId, TypeInfo};
use crate::constants::storage::DB_MAGIC;
use crate::storage::PageId;
use crate::storage::buffer_manager::BufferManager;
use crate::storage::disk_manager::{DiskError, DiskManager};
use crate::storage::heap::{HeapError, HeapFile};
use log::info;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Heap(#[from] HeapError),
    #[error(transparent)]
    Disk(#[from] DiskError),
}

/// The self-describing system catalog: three heap files holding table,
/// column and type metadata, including rows describing the catalogs
/// themselves. `init` bootstraps a fresh database or reloads an existing
/// one depending on the magic marker in page 0.
pub struct Catalog {
    bm: Rc<RefCell<BufferManager>>,
    dm: Rc<RefCell<DiskManager>>,
    tables: Option<CatalogTable<TableInfo>>,
    attributes: Option<CatalogTable<ColumnInfo>>,
    types: Option<CatalogTable<TypeInfo>>,
}

impl Catalog {
    pub fn new(bm: Rc<RefCell<BufferManager>>, dm: Rc<RefCell<DiskManager>>) -> Self {
        Self {
            bm,
            dm,
            tables: None,
            attributes: None,
            types: None,
        }
    }

    pub fn init(&mut self) -> Result<(), CatalogError> {
        if self.is_initialised() {
            self.load();
        } else {
            self.bootstrap()?;
        }
        Ok(())
    }

    /// True iff the file already holds a bootstrapped database: at least
    /// one page, and page 0 carrying the magic constant.
    pub fn is_initialised(&self) -> bool {
        if self.dm.borrow().num_pages() == 0 {
            return false;
        }
        let mut bm = self.bm.borrow_mut();
        let fid = bm.request(DB_HEADER_PAGE_ID);
        let magic = u32::from_le_bytes(bm.frame(fid).data()[0..4].try_into().unwrap());
        bm.release(DB_HEADER_PAGE_ID);
        magic == DB_MAGIC
    }

    /// Reopens the catalog heap files of an existing database at their
    /// well-known root pages. No I/O beyond the `is_initialised` probe.
    fn load(&mut self) {
        self.tables = Some(CatalogTable::new(HeapFile::open(
            self.bm.clone(),
            self.dm.clone(),
            DB_TABLES_FILE_ID,
            DB_TABLES_ROOT_PAGE_ID,
        )));
        self.attributes = Some(CatalogTable::new(HeapFile::open(
            self.bm.clone(),
            self.dm.clone(),
            DB_ATTRIBUTES_FILE_ID,
            DB_ATTRIBUTES_ROOT_PAGE_ID,
        )));
        self.types = Some(CatalogTable::new(HeapFile::open(
            self.bm.clone(),
            self.dm.clone(),
            DB_TYPES_FILE_ID,
            DB_TYPES_ROOT_PAGE_ID,
        )));
        info!("catalog loaded from existing database");
    }

    /// Lays out a fresh database: magic header in page 0, one empty heap
    /// page per catalog at the well-known roots, the built-in type rows,
    /// and a self-describing row set for each catalog.
    fn bootstrap(&mut self) -> Result<(), CatalogError> {
        // page 0: database header
        let header_page = self.dm.borrow_mut().allocate_page()?;
        assert_eq!(
            header_page, DB_HEADER_PAGE_ID,
            "bootstrap must run on an empty file"
        );
        {
            let mut bm = self.bm.borrow_mut();
            let fid = bm.request(header_page);
            bm.frame_mut(fid).data_mut()[0..4].copy_from_slice(&DB_MAGIC.to_le_bytes());
            bm.mark_dirty(fid);
            bm.release(header_page);
        }

        // pages 1..3: catalog roots. Allocation order must reproduce the
        // well-known ids the loader reopens at.
        let tables_hf =
            HeapFile::create(self.bm.clone(), self.dm.clone(), DB_TABLES_FILE_ID)?;
        assert_eq!(tables_hf.first_page_id(), DB_TABLES_ROOT_PAGE_ID);
        let attributes_hf =
            HeapFile::create(self.bm.clone(), self.dm.clone(), DB_ATTRIBUTES_FILE_ID)?;
        assert_eq!(attributes_hf.first_page_id(), DB_ATTRIBUTES_ROOT_PAGE_ID);
        let types_hf = HeapFile::create(self.bm.clone(), self.dm.clone(), DB_TYPES_FILE_ID)?;
        assert_eq!(types_hf.first_page_id(), DB_TYPES_ROOT_PAGE_ID);

        self.tables = Some(CatalogTable::new(tables_hf));
        self.attributes = Some(CatalogTable::new(attributes_hf));
        self.types = Some(CatalogTable::new(types_hf));

        self.insert_builtin_types()?;
        self.insert_catalog_metadata()?;

        self.bm.borrow_mut().flush_all();
        info!("bootstrapped fresh database");
        Ok(())
    }

    fn insert_builtin_types(&mut self) -> Result<(), CatalogError> {
        let types = self.types.as_mut().unwrap();
        types.insert(&TypeInfo {
            type_id: INT_TYPE_ID,
            size: INT_SIZE,
            type_name: "INT".to_string(),
        })?;
        types.insert(&TypeInfo {
            type_id: TEXT_TYPE_ID,
            size: TEXT_SIZE,
            type_name: "TEXT".to_string(),
        })?;
        Ok(())
    }

    /// Inserts a `db_tables` row plus `db_attributes` rows for each of
    /// the three catalogs, so the catalog describes itself.
    fn insert_catalog_metadata(&mut self) -> Result<(), CatalogError> {
        let entries = [
            (
                DB_TABLES_TABLE_ID,
                DB_TABLES_NAME,
                DB_TABLES_FILE_ID,
                DB_TABLES_ROOT_PAGE_ID,
                TableInfo::schema(),
            ),
            (
                DB_ATTRIBUTES_TABLE_ID,
                DB_ATTRIBUTES_NAME,
                DB_ATTRIBUTES_FILE_ID,
                DB_ATTRIBUTES_ROOT_PAGE_ID,
                ColumnInfo::schema(),
            ),
            (
                DB_TYPES_TABLE_ID,
                DB_TYPES_NAME,
                DB_TYPES_FILE_ID,
                DB_TYPES_ROOT_PAGE_ID,
                TypeInfo::schema(),
            ),
        ];

        for (table_id, name, file_id, root_page, schema) in entries {
            self.tables.as_mut().unwrap().insert(&TableInfo {
                table_id,
                table_name: name.to_string(),
                heap_file_id: file_id,
                first_page_id: root_page,
            })?;
            let attributes = self.attributes.as_mut().unwrap();
            for col in schema.iter() {
                attributes.insert(col)?;
            }
        }
        Ok(())
    }

    /// Creates a user table: a fresh heap file plus its `db_tables` and
    /// `db_attributes` rows. Returns the new table id. Detecting
    /// duplicate names is the caller's job (look up first).
    pub fn create_table(
        &mut self,
        table_name: &str,
        columns: &[RawColumnInfo],
    ) -> Result<TableId, CatalogError> {
        let table_id = Uuid::new_v4();
        let file_id = Uuid::new_v4();
        let heap = HeapFile::create(self.bm.clone(), self.dm.clone(), file_id)?;

        self.tables.as_mut().unwrap().insert(&TableInfo {
            table_id,
            table_name: table_name.to_string(),
            heap_file_id: file_id,
            first_page_id: heap.first_page_id(),
        })?;

        let attributes = self.attributes.as_mut().unwrap();
        for col in columns {
            attributes.insert(&ColumnInfo {
                table_id,
                col_name: col.col_name.clone(),
                type_id: col.type_id,
                ordinal_position: col.ordinal_position,
            })?;
        }

        info!(
            "created table {table_name} ({} columns) as {table_id}",
            columns.len()
        );
        Ok(table_id)
    }

    pub fn lookup_table(&self, table_name: &str) -> Option<TableInfo> {
        self.tables.as_ref().unwrap().lookup(table_name)
    }

    pub fn get_table_columns(&self, table_id: TableId) -> Vec<ColumnInfo> {
        self.attributes.as_ref().unwrap().columns_of(table_id)
    }

    pub fn get_type(&self, type_id: TypeId) -> Option<TypeInfo> {
        self.types.as_ref().unwrap().get(type_id)
    }

    /// First page of a catalog's own heap, for self-description checks.
    pub fn first_page_of(&self, table_name: &str) -> Option<PageId> {
        match table_name {
            DB_TABLES_NAME => Some(self.tables.as_ref().unwrap().heap().first_page_id()),
            DB_ATTRIBUTES_NAME => Some(self.attributes.as_ref().unwrap().heap().first_page_id()),
            DB_TYPES_NAME => Some(self.types.as_ref().unwrap().heap().first_page_id()),
            _ => None,
        }
    }
}
