use crate::catalog::types::{ColumnInfo, TableId};
use crate::model::dynamic_codec::{self, DynamicCodecError};
use crate::storage::heap::{HeapError, HeapFile, Record, Rid};
use crate::value::{Schema, Tuple, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Codec(#[from] DynamicCodecError),
    #[error(transparent)]
    Heap(#[from] HeapError),
}

/// A user table: a heap file plus the column list that drives the
/// dynamic row codec. Values are accepted and produced in schema order.
pub struct UserTable {
    heap: HeapFile,
    columns: Schema,
    table_id: TableId,
}

impl UserTable {
    pub fn new(heap: HeapFile, columns: Vec<ColumnInfo>, table_id: TableId) -> Self {
        Self {
            heap,
            columns: Arc::new(columns),
            table_id,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn schema(&self) -> Schema {
        self.columns.clone()
    }

    pub(crate) fn heap(&self) -> &HeapFile {
        &self.heap
    }

    pub(crate) fn heap_mut(&mut self) -> &mut HeapFile {
        &mut self.heap
    }

    /// Encodes `values` against the table schema and appends the row.
    pub fn insert(&mut self, values: &[Value]) -> Result<Rid, TableError> {
        let bytes = dynamic_codec::encode(values, &self.columns)?;
        Ok(self.heap.insert(&bytes)?)
    }

    /// Decodes a raw heap record into a tuple tagged with this table's
    /// shared schema.
    pub fn decode(&self, record: &Record) -> Result<Tuple, DynamicCodecError> {
        let values = dynamic_codec::decode(&record.data, &self.columns)?;
        Ok(Tuple::new(values, self.columns.clone()))
    }
}
