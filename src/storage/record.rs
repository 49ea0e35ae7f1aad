#![forbid(unsafe_code)]
//! Fixed-width encoding of a single phonebook record.
//!
//! A record is two NUL-terminated text fields, each padded to
//! [`FIELD_WIDTH`] bytes. The longest storable value therefore is
//! `FIELD_WIDTH - 1` bytes.

use std::ops::Range;

use serde::Serialize;

use crate::types::{PhoneDbError, Result};

/// On-disk width of one field, terminator included.
pub const FIELD_WIDTH: usize = 64;
/// Longest value a field can hold.
pub const FIELD_MAX_LEN: usize = FIELD_WIDTH - 1;
/// On-disk width of one encoded record.
pub const RECORD_LEN: usize = FIELD_WIDTH * 2;

const NAME: Range<usize> = 0..FIELD_WIDTH;
const PHONE: Range<usize> = FIELD_WIDTH..RECORD_LEN;

/// One stored entry: a name and the phone number it is sorted by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Display name.
    pub name: String,
    /// Sort key.
    pub phone: String,
}

impl Record {
    /// Builds a record, checking both fields fit their fixed width.
    ///
    /// Both fields must be non-empty single tokens: the shell splits an
    /// insert on spaces, so a field that is empty or holds a space could
    /// never be typed back.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Result<Self> {
        let record = Self {
            name: name.into(),
            phone: phone.into(),
        };
        check_field("name", &record.name)?;
        check_field("phone", &record.phone)?;
        Ok(record)
    }

    /// Returns the key bytes used for ordering.
    pub fn key(&self) -> &[u8] {
        self.phone.as_bytes()
    }

    /// Encodes the record into its fixed-width block.
    pub fn encode(&self) -> Result<[u8; RECORD_LEN]> {
        let mut buf = [0u8; RECORD_LEN];
        put_field(&mut buf[NAME], "name", &self.name)?;
        put_field(&mut buf[PHONE], "phone", &self.phone)?;
        Ok(buf)
    }

    /// Decodes a fixed-width block.
    ///
    /// Any bytes decode to some record: each field ends at its first NUL (or
    /// at the field boundary) and invalid UTF-8 is replaced.
    pub fn decode(buf: &[u8; RECORD_LEN]) -> Self {
        Self {
            name: get_field(&buf[NAME]),
            phone: get_field(&buf[PHONE]),
        }
    }
}

fn check_field(field: &'static str, value: &str) -> Result<()> {
    if value.len() > FIELD_MAX_LEN {
        return Err(PhoneDbError::FieldTooLong {
            field,
            len: value.len(),
            max: FIELD_MAX_LEN,
        });
    }
    if value.is_empty() {
        return Err(PhoneDbError::BadFormat(format!("field `{field}` is empty")));
    }
    if value.contains(' ') {
        return Err(PhoneDbError::BadFormat(format!(
            "field `{field}` contains a space"
        )));
    }
    if value.as_bytes().contains(&0) {
        return Err(PhoneDbError::BadFormat(format!(
            "field `{field}` contains a NUL byte"
        )));
    }
    Ok(())
}

fn put_field(dst: &mut [u8], field: &'static str, value: &str) -> Result<()> {
    check_field(field, value)?;
    let bytes = value.as_bytes();
    dst[..bytes.len()].copy_from_slice(bytes);
    dst[bytes.len()..].fill(0);
    Ok(())
}

fn get_field(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}
