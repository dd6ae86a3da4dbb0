//! Byte-level serialisation primitives shared by the catalog codecs and
//! the dynamic row codec.
//!
//! Fixed-width values are written little-endian with no padding.
//! Variable-width values (strings) are written as a `u32` length followed
//! by that many bytes. UUIDs are written as their 16 raw bytes.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of record at offset {0}")]
    UnexpectedEof(usize),
    #[error("record contains invalid utf-8 text")]
    InvalidUtf8,
}

pub fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_uuid(buf: &mut Vec<u8>, v: &Uuid) {
    buf.extend_from_slice(v.as_bytes());
}

pub fn put_string(buf: &mut Vec<u8>, v: &str) {
    put_u32(buf, v.len() as u32);
    buf.extend_from_slice(v.as_bytes());
}

fn take<'a>(buf: &'a [u8], off: &mut usize, n: usize) -> Result<&'a [u8], CodecError> {
    let end = *off + n;
    if end > buf.len() {
        return Err(CodecError::UnexpectedEof(*off));
    }
    let bytes = &buf[*off..end];
    *off = end;
    Ok(bytes)
}

pub fn get_u16(buf: &[u8], off: &mut usize) -> Result<u16, CodecError> {
    let bytes = take(buf, off, 2)?;
    Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn get_u32(buf: &[u8], off: &mut usize) -> Result<u32, CodecError> {
    let bytes = take(buf, off, 4)?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn get_i32(buf: &[u8], off: &mut usize) -> Result<i32, CodecError> {
    let bytes = take(buf, off, 4)?;
    Ok(i32::from_le_bytes(bytes.try_into().unwrap()))
}

pub fn get_uuid(buf: &[u8], off: &mut usize) -> Result<Uuid, CodecError> {
    let bytes = take(buf, off, 16)?;
    Ok(Uuid::from_bytes(bytes.try_into().unwrap()))
}

pub fn get_string(buf: &[u8], off: &mut usize) -> Result<String, CodecError> {
    let len = get_u32(buf, off)? as usize;
    let bytes = take(buf, off, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_round_trip() {
        let mut buf = Vec::new();
        put_u16(&mut buf, 0xBEEF);
        put_u32(&mut buf, 123_456_789);
        put_i32(&mut buf, -1);
        assert_eq!(buf.len(), 10);

        let mut off = 0;
        assert_eq!(get_u16(&buf, &mut off).unwrap(), 0xBEEF);
        assert_eq!(get_u32(&buf, &mut off).unwrap(), 123_456_789);
        assert_eq!(get_i32(&buf, &mut off).unwrap(), -1);
        assert_eq!(off, buf.len());
    }

    #[test]
    fn string_is_length_prefixed() {
        let mut buf = Vec::new();
        put_string(&mut buf, "hello");
        assert_eq!(&buf[..4], &5u32.to_le_bytes());
        assert_eq!(&buf[4..], b"hello");

        let mut off = 0;
        assert_eq!(get_string(&buf, &mut off).unwrap(), "hello");
    }

    #[test]
    fn uuid_round_trip() {
        let id = Uuid::new_v4();
        let mut buf = Vec::new();
        put_uuid(&mut buf, &id);
        assert_eq!(buf.len(), 16);

        let mut off = 0;
        assert_eq!(get_uuid(&buf, &mut off).unwrap(), id);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let buf = vec![1u8, 2];
        let mut off = 0;
        assert!(matches!(
            get_u32(&buf, &mut off),
            Err(CodecError::UnexpectedEof(0))
        ));

        let mut buf = Vec::new();
        put_u32(&mut buf, 100); // claims 100 bytes of text follow
        let mut off = 0;
        assert!(get_string(&buf, &mut off).is_err());
    }
}
