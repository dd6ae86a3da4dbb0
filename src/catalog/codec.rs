//! Hand-written codecs for the catalog row types.
//!
//! Each row encodes its fields in schema column order with the shared
//! primitives: fixed-width values little-endian with no padding, strings
//! length-prefixed, UUIDs as 16 raw bytes. `to_values` and `schema` let
//! catalog rows flow through the operator pipeline like any user tuple.

use crate::catalog::schema;
use crate::catalog::types::{ColumnInfo, TableInfo, TypeInfo};
use crate::codec::{
    CodecError, get_i32, get_string, get_u16, get_u32, get_uuid, put_i32, put_string, put_u16,
    put_u32, put_uuid,
};
use crate::value::{Schema, Value};

pub trait CatalogRow: Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;
    fn to_values(&self) -> Vec<Value>;
    fn schema() -> Schema;
}

impl CatalogRow for TableInfo {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_uuid(&mut buf, &self.table_id);
        put_string(&mut buf, &self.table_name);
        put_uuid(&mut buf, &self.heap_file_id);
        put_i32(&mut buf, self.first_page_id);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut off = 0;
        Ok(Self {
            table_id: get_uuid(bytes, &mut off)?,
            table_name: get_string(bytes, &mut off)?,
            heap_file_id: get_uuid(bytes, &mut off)?,
            first_page_id: get_i32(bytes, &mut off)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Uuid(self.table_id),
            Value::Text(self.table_name.clone()),
            Value::Uuid(self.heap_file_id),
            Value::PageId(self.first_page_id),
        ]
    }

    fn schema() -> Schema {
        schema::tables_schema()
    }
}

impl CatalogRow for ColumnInfo {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_uuid(&mut buf, &self.table_id);
        put_string(&mut buf, &self.col_name);
        put_u32(&mut buf, self.type_id);
        put_u16(&mut buf, self.ordinal_position);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut off = 0;
        Ok(Self {
            table_id: get_uuid(bytes, &mut off)?,
            col_name: get_string(bytes, &mut off)?,
            type_id: get_u32(bytes, &mut off)?,
            ordinal_position: get_u16(bytes, &mut off)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Uuid(self.table_id),
            Value::Text(self.col_name.clone()),
            Value::Int(self.type_id),
            Value::Int(self.ordinal_position as u32),
        ]
    }

    fn schema() -> Schema {
        schema::attributes_schema()
    }
}

impl CatalogRow for TypeInfo {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_u32(&mut buf, self.type_id);
        put_u16(&mut buf, self.size);
        put_string(&mut buf, &self.type_name);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut off = 0;
        Ok(Self {
            type_id: get_u32(bytes, &mut off)?,
            size: get_u16(bytes, &mut off)?,
            type_name: get_string(bytes, &mut off)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int(self.type_id),
            Value::Int(self.size as u32),
            Value::Text(self.type_name.clone()),
        ]
    }

    fn schema() -> Schema {
        schema::types_schema()
    }
}
