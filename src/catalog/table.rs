use crate::catalog::codec::CatalogRow;
use crate::catalog::types::{ColumnInfo, TableId, TableInfo, TypeId, TypeInfo};
use crate::storage::heap::{HeapError, HeapFile, Rid};
use std::marker::PhantomData;

/// A typed view over a catalog heap file: rows of one kind, encoded and
/// decoded by that kind's codec.
pub struct CatalogTable<R: CatalogRow> {
    heap: HeapFile,
    _row: PhantomData<R>,
}

impl<R: CatalogRow> CatalogTable<R> {
    pub fn new(heap: HeapFile) -> Self {
        Self {
            heap,
            _row: PhantomData,
        }
    }

    pub fn insert(&mut self, row: &R) -> Result<Rid, HeapError> {
        self.heap.insert(&row.encode())
    }

    /// Decoding scan over every live row. A row that fails to decode is
    /// a corrupt catalog, which is unrecoverable.
    pub fn rows(&self) -> impl Iterator<Item = R> + use<R> {
        self.heap
            .scan()
            .map(|rec| R::decode(&rec.data).expect("corrupt catalog row"))
    }

    pub fn heap(&self) -> &HeapFile {
        &self.heap
    }
}

impl CatalogTable<TableInfo> {
    /// Linear scan of `db_tables` by name.
    pub fn lookup(&self, table_name: &str) -> Option<TableInfo> {
        self.rows().find(|row| row.table_name == table_name)
    }
}

impl CatalogTable<ColumnInfo> {
    /// Columns of `table_id`, ordered by ordinal position.
    pub fn columns_of(&self, table_id: TableId) -> Vec<ColumnInfo> {
        let mut columns: Vec<ColumnInfo> =
            self.rows().filter(|row| row.table_id == table_id).collect();
        columns.sort_by_key(|col| col.ordinal_position);
        columns
    }
}

impl CatalogTable<TypeInfo> {
    pub fn get(&self, type_id: TypeId) -> Option<TypeInfo> {
        self.rows().find(|row| row.type_id == type_id)
    }

    pub fn all(&self) -> Vec<TypeInfo> {
        self.rows().collect()
    }
}
