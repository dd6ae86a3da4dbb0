use crate::catalog::codec::CatalogRow;
use crate::catalog::types::{ColumnInfo, TableInfo, TypeInfo};
use crate::model::dynamic_codec::DynamicCodecError;
use crate::model::user_table::UserTable;
use crate::storage::heap::{HeapFile, HeapIterator, Record, Rid};
use crate::value::{Schema, Tuple};

/// Which system catalog a [`CatalogRelation`] scans.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatalogKind {
    Tables,
    Attributes,
    Types,
}

/// A system catalog opened as a scannable relation: records decode
/// through the catalog row codec for `kind` instead of the dynamic codec.
pub struct CatalogRelation {
    heap: HeapFile,
    kind: CatalogKind,
}

impl CatalogRelation {
    pub fn new(heap: HeapFile, kind: CatalogKind) -> Self {
        Self { heap, kind }
    }

    fn decode(&self, record: &Record) -> Result<Tuple, DynamicCodecError> {
        let (values, schema) = match self.kind {
            CatalogKind::Tables => {
                let row = TableInfo::decode(&record.data)?;
                (row.to_values(), TableInfo::schema())
            }
            CatalogKind::Attributes => {
                let row = ColumnInfo::decode(&record.data)?;
                (row.to_values(), ColumnInfo::schema())
            }
            CatalogKind::Types => {
                let row = TypeInfo::decode(&record.data)?;
                (row.to_values(), TypeInfo::schema())
            }
        };
        Ok(Tuple::new(values, schema))
    }

    fn schema(&self) -> Schema {
        match self.kind {
            CatalogKind::Tables => TableInfo::schema(),
            CatalogKind::Attributes => ColumnInfo::schema(),
            CatalogKind::Types => TypeInfo::schema(),
        }
    }
}

/// Something the executor can sequentially scan and decode. The two
/// variants are closed and finite: system catalogs decode through their
/// static codecs, user tables through the schema-driven dynamic codec.
pub enum Relation {
    Catalog(CatalogRelation),
    User(UserTable),
}

impl Relation {
    /// Opaque insert of pre-encoded bytes into the backing heap.
    /// `None` when the record cannot be stored (capacity).
    pub fn insert_raw(&mut self, bytes: &[u8]) -> Option<Rid> {
        let heap = match self {
            Relation::Catalog(rel) => &mut rel.heap,
            Relation::User(table) => table.heap_mut(),
        };
        heap.insert(bytes).ok()
    }

    /// Forward scan over the backing heap.
    pub fn begin(&self) -> HeapIterator {
        match self {
            Relation::Catalog(rel) => rel.heap.scan(),
            Relation::User(table) => table.heap().scan(),
        }
    }

    /// Decodes one raw record into a schema-tagged tuple.
    pub fn decode(&self, record: &Record) -> Result<Tuple, DynamicCodecError> {
        match self {
            Relation::Catalog(rel) => rel.decode(record),
            Relation::User(table) => table.decode(record),
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            Relation::Catalog(rel) => rel.schema(),
            Relation::User(table) => table.schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{INT_TYPE_ID, TEXT_TYPE_ID};
    use crate::storage::buffer_manager::BufferManager;
    use crate::storage::clock::ClockPolicy;
    use crate::storage::disk_manager::DiskManager;
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn heap() -> (TempDir, HeapFile) {
        let dir = TempDir::new().unwrap();
        let dm = Rc::new(RefCell::new(
            DiskManager::open(dir.path().join("rel.db")).unwrap(),
        ));
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            16,
            Box::new(ClockPolicy::new(16)),
        )));
        let hf = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();
        (dir, hf)
    }

    #[test]
    fn catalog_relation_decodes_via_static_codec() {
        let (_dir, hf) = heap();
        let mut rel = Relation::Catalog(CatalogRelation::new(hf, CatalogKind::Types));

        let row = TypeInfo {
            type_id: INT_TYPE_ID,
            size: 4,
            type_name: "INT".to_string(),
        };
        rel.insert_raw(&row.encode()).unwrap();

        let record = rel.begin().next().unwrap();
        let tuple = rel.decode(&record).unwrap();
        assert_eq!(
            tuple.values(),
            &[
                Value::Int(INT_TYPE_ID),
                Value::Int(4),
                Value::Text("INT".to_string())
            ]
        );
        assert_eq!(rel.schema().len(), 3);
    }

    #[test]
    fn user_relation_decodes_via_dynamic_codec() {
        let (_dir, hf) = heap();
        let table_id = Uuid::new_v4();
        let columns = vec![
            ColumnInfo {
                table_id,
                col_name: "id".to_string(),
                type_id: INT_TYPE_ID,
                ordinal_position: 1,
            },
            ColumnInfo {
                table_id,
                col_name: "name".to_string(),
                type_id: TEXT_TYPE_ID,
                ordinal_position: 2,
            },
        ];
        let mut table = UserTable::new(hf, columns, table_id);
        table
            .insert(&[Value::Int(5), Value::Text("Eve".to_string())])
            .unwrap();

        let rel = Relation::User(table);
        let record = rel.begin().next().unwrap();
        let tuple = rel.decode(&record).unwrap();
        assert_eq!(
            tuple.values(),
            &[Value::Int(5), Value::Text("Eve".to_string())]
        );
    }
}
