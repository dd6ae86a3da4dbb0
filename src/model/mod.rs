pub mod dynamic_codec;
pub mod relation;
pub mod table_manager;
pub mod user_table;

pub use relation::{CatalogKind, CatalogRelation, Relation};
pub use table_manager::{TableManager, TableManagerError};
pub use user_table::{TableError, UserTable};
