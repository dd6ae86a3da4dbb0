use crate::catalog::types::ColumnInfo;
use crate::storage::PageId;
use std::sync::Arc;
use uuid::Uuid;

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u32),
    Text(String),
    Uuid(Uuid),
    PageId(PageId),
}

/// Column list shared by every tuple of one relation. Immutable once
/// built; tuples hold a reference-counted handle instead of copies.
pub type Schema = Arc<Vec<ColumnInfo>>;

/// A decoded row: values in schema order plus the shared schema handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    values: Vec<Value>,
    schema: Schema,
}

impl Tuple {
    pub fn new(values: Vec<Value>, schema: Schema) -> Self {
        Self { values, schema }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
