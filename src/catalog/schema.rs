//! Well-known identifiers and schemas of the system catalogs.
//!
//! The catalogs are ordinary heap files rooted at fixed pages directly
//! behind the database header, so an existing database can be reopened
//! without consulting anything but these constants.

use crate::catalog::types::{ColumnInfo, FileId, TableId, TypeId};
use crate::storage::PageId;
use crate::value::Schema;
use std::sync::Arc;
use uuid::Uuid;

const fn well_known_id(low: u8) -> Uuid {
    Uuid::from_bytes([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, low])
}

// table and heap-file ids of the catalogs themselves
pub const DB_TABLES_TABLE_ID: TableId = well_known_id(1);
pub const DB_ATTRIBUTES_TABLE_ID: TableId = well_known_id(2);
pub const DB_TYPES_TABLE_ID: TableId = well_known_id(3);
pub const DB_TABLES_FILE_ID: FileId = well_known_id(1);
pub const DB_ATTRIBUTES_FILE_ID: FileId = well_known_id(2);
pub const DB_TYPES_FILE_ID: FileId = well_known_id(3);

pub const DB_TABLES_NAME: &str = "db_tables";
pub const DB_ATTRIBUTES_NAME: &str = "db_attributes";
pub const DB_TYPES_NAME: &str = "db_types";

// fixed on-disk layout: header page, then one root page per catalog
pub const DB_HEADER_PAGE_ID: PageId = 0;
pub const DB_TABLES_ROOT_PAGE_ID: PageId = 1;
pub const DB_ATTRIBUTES_ROOT_PAGE_ID: PageId = 2;
pub const DB_TYPES_ROOT_PAGE_ID: PageId = 3;

// built-in types
pub const INT_TYPE_ID: TypeId = 1;
pub const INT_SIZE: u16 = 4;
pub const INT_ALIGNMENT: usize = 4;
pub const TEXT_TYPE_ID: TypeId = 2;
pub const TEXT_SIZE: u16 = 0; // variable length
pub const TEXT_ALIGNMENT: usize = 4;

fn column(table_id: TableId, name: &str, type_id: TypeId, ordinal: u16) -> ColumnInfo {
    ColumnInfo {
        table_id,
        col_name: name.to_string(),
        type_id,
        ordinal_position: ordinal,
    }
}

/// Schema of `db_tables(table_id, table_name, heap_file_id, first_page_id)`.
pub fn tables_schema() -> Schema {
    Arc::new(vec![
        column(DB_TABLES_TABLE_ID, "table_id", INT_TYPE_ID, 1),
        column(DB_TABLES_TABLE_ID, "table_name", TEXT_TYPE_ID, 2),
        column(DB_TABLES_TABLE_ID, "heap_file_id", INT_TYPE_ID, 3),
        column(DB_TABLES_TABLE_ID, "first_page_id", INT_TYPE_ID, 4),
    ])
}

/// Schema of `db_attributes(table_id, col_name, type_id, ordinal_position)`.
pub fn attributes_schema() -> Schema {
    Arc::new(vec![
        column(DB_ATTRIBUTES_TABLE_ID, "table_id", INT_TYPE_ID, 1),
        column(DB_ATTRIBUTES_TABLE_ID, "col_name", TEXT_TYPE_ID, 2),
        column(DB_ATTRIBUTES_TABLE_ID, "type_id", INT_TYPE_ID, 3),
        column(DB_ATTRIBUTES_TABLE_ID, "ordinal_position", INT_TYPE_ID, 4),
    ])
}

/// Schema of `db_types(type_id, size, type_name)`.
pub fn types_schema() -> Schema {
    Arc::new(vec![
        column(DB_TYPES_TABLE_ID, "type_id", INT_TYPE_ID, 1),
        column(DB_TYPES_TABLE_ID, "size", INT_TYPE_ID, 2),
        column(DB_TYPES_TABLE_ID, "type_name", TEXT_TYPE_ID, 3),
    ])
}
