use crate::storage::PageId;
use uuid::Uuid;

/// Opaque 16-byte table identifier. Generated fresh for every
/// `CREATE TABLE`; never interpreted.
pub type TableId = Uuid;

/// Opaque 16-byte heap-file identifier.
pub type FileId = Uuid;

/// Identifier of a built-in value type in `db_types`.
pub type TypeId = u32;

/// One row of `db_tables`: maps a table name to its heap file and the
/// root page of that heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub heap_file_id: FileId,
    pub first_page_id: PageId,
}

/// One row of `db_attributes`: a single column of some table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub table_id: TableId,
    pub col_name: String,
    pub type_id: TypeId,
    pub ordinal_position: u16,
}

/// Column description as supplied by the caller of `CreateTable`, before
/// a table id exists to tag it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumnInfo {
    pub col_name: String,
    pub type_id: TypeId,
    pub ordinal_position: u16,
}

/// One row of `db_types`. `size` is the fixed byte width, with 0 as the
/// variable-length sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_id: TypeId,
    pub size: u16,
    pub type_name: String,
}
