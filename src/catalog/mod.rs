pub mod codec;
pub mod manager;
pub mod schema;
pub mod table;
pub mod types;

pub use codec::CatalogRow;
pub use manager::{Catalog, CatalogError};
pub use table::CatalogTable;
pub use types::{ColumnInfo, FileId, RawColumnInfo, TableId, TableInfo, TypeId, TypeInfo};
