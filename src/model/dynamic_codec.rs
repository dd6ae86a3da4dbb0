//! Schema-driven row codec for user tables.
//!
//! Values are written in schema column order. Before each value the
//! buffer is padded with zeroes to the column type's natural alignment
//! (INT and TEXT both align to 4); decoding skips the same padding. INT
//! is four little-endian bytes, TEXT a `u32` length plus the bytes.

use crate::catalog::schema::{INT_ALIGNMENT, INT_TYPE_ID, TEXT_ALIGNMENT, TEXT_TYPE_ID};
use crate::catalog::types::{ColumnInfo, TypeId};
use crate::codec::{CodecError, get_string, get_u32, put_string, put_u32};
use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DynamicCodecError {
    #[error("expected {expected} values for schema, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },
    #[error("value for column {0} does not match its declared type")]
    TypeMismatch(String),
    #[error("column {col} has unknown type id {type_id}")]
    UnknownType { col: String, type_id: TypeId },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn alignment_of(type_id: TypeId) -> Option<usize> {
    match type_id {
        INT_TYPE_ID => Some(INT_ALIGNMENT),
        TEXT_TYPE_ID => Some(TEXT_ALIGNMENT),
        _ => None,
    }
}

fn apply_padding(buf: &mut Vec<u8>, alignment: usize) {
    let rem = buf.len() % alignment;
    if rem != 0 {
        buf.resize(buf.len() + alignment - rem, 0);
    }
}

fn skip_padding(off: &mut usize, alignment: usize) {
    let rem = *off % alignment;
    if rem != 0 {
        *off += alignment - rem;
    }
}

pub fn encode(values: &[Value], schema: &[ColumnInfo]) -> Result<Vec<u8>, DynamicCodecError> {
    if values.len() != schema.len() {
        return Err(DynamicCodecError::ColumnCountMismatch {
            expected: schema.len(),
            got: values.len(),
        });
    }

    let mut buf = Vec::new();
    for (value, col) in values.iter().zip(schema) {
        let alignment = alignment_of(col.type_id).ok_or_else(|| DynamicCodecError::UnknownType {
            col: col.col_name.clone(),
            type_id: col.type_id,
        })?;
        apply_padding(&mut buf, alignment);

        match (value, col.type_id) {
            (Value::Int(v), INT_TYPE_ID) => put_u32(&mut buf, *v),
            (Value::Text(s), TEXT_TYPE_ID) => put_string(&mut buf, s),
            _ => return Err(DynamicCodecError::TypeMismatch(col.col_name.clone())),
        }
    }
    Ok(buf)
}

pub fn decode(bytes: &[u8], schema: &[ColumnInfo]) -> Result<Vec<Value>, DynamicCodecError> {
    let mut values = Vec::with_capacity(schema.len());
    let mut off = 0;

    for col in schema {
        let alignment = alignment_of(col.type_id).ok_or_else(|| DynamicCodecError::UnknownType {
            col: col.col_name.clone(),
            type_id: col.type_id,
        })?;
        skip_padding(&mut off, alignment);

        let value = match col.type_id {
            INT_TYPE_ID => Value::Int(get_u32(bytes, &mut off)?),
            TEXT_TYPE_ID => Value::Text(get_string(bytes, &mut off)?),
            _ => unreachable!("alignment_of already rejected unknown types"),
        };
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{INT_TYPE_ID, TEXT_TYPE_ID};
    use uuid::Uuid;

    fn columns(types: &[(&str, TypeId)]) -> Vec<ColumnInfo> {
        let table_id = Uuid::nil();
        types
            .iter()
            .enumerate()
            .map(|(i, (name, type_id))| ColumnInfo {
                table_id,
                col_name: name.to_string(),
                type_id: *type_id,
                ordinal_position: (i + 1) as u16,
            })
            .collect()
    }

    #[test]
    fn int_text_row_round_trips() {
        let schema = columns(&[("id", INT_TYPE_ID), ("name", TEXT_TYPE_ID)]);
        let values = vec![Value::Int(1), Value::Text("Alice".to_string())];

        let bytes = encode(&values, &schema).unwrap();
        assert_eq!(decode(&bytes, &schema).unwrap(), values);
    }

    #[test]
    fn layout_is_aligned_and_length_prefixed() {
        let schema = columns(&[("id", INT_TYPE_ID), ("name", TEXT_TYPE_ID)]);
        let bytes = encode(
            &[Value::Int(7), Value::Text("ab".to_string())],
            &schema,
        )
        .unwrap();

        // int at 0..4, text length at 4..8, bytes after
        assert_eq!(&bytes[0..4], &7u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..10], b"ab");
        assert_eq!(bytes.len(), 10);
    }

    #[test]
    fn text_then_int_pads_to_alignment() {
        let schema = columns(&[("name", TEXT_TYPE_ID), ("id", INT_TYPE_ID)]);
        let bytes = encode(
            &[Value::Text("abc".to_string()), Value::Int(9)],
            &schema,
        )
        .unwrap();

        // text occupies 4 + 3 = 7 bytes, then one zero pad byte before the int
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[7], 0);
        assert_eq!(&bytes[8..12], &9u32.to_le_bytes());

        let values = decode(&bytes, &schema).unwrap();
        assert_eq!(
            values,
            vec![Value::Text("abc".to_string()), Value::Int(9)]
        );
    }

    #[test]
    fn empty_text_and_zero_int_round_trip() {
        let schema = columns(&[("a", TEXT_TYPE_ID), ("b", INT_TYPE_ID)]);
        let values = vec![Value::Text(String::new()), Value::Int(0)];
        let bytes = encode(&values, &schema).unwrap();
        assert_eq!(decode(&bytes, &schema).unwrap(), values);
    }

    #[test]
    fn arity_and_type_errors_are_reported() {
        let schema = columns(&[("id", INT_TYPE_ID)]);

        assert!(matches!(
            encode(&[], &schema),
            Err(DynamicCodecError::ColumnCountMismatch { expected: 1, got: 0 })
        ));
        assert!(matches!(
            encode(&[Value::Text("oops".to_string())], &schema),
            Err(DynamicCodecError::TypeMismatch(_))
        ));

        let bad_schema = columns(&[("blob", 42)]);
        assert!(matches!(
            encode(&[Value::Int(0)], &bad_schema),
            Err(DynamicCodecError::UnknownType { type_id: 42, .. })
        ));
    }

    #[test]
    fn truncated_rows_fail_to_decode() {
        let schema = columns(&[("id", INT_TYPE_ID), ("name", TEXT_TYPE_ID)]);
        let bytes = encode(
            &[Value::Int(1), Value::Text("long enough".to_string())],
            &schema,
        )
        .unwrap();
        assert!(decode(&bytes[..6], &schema).is_err());
    }
}
