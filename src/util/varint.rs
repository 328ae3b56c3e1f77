//! Variable-length integer coding.
//!
//! Seven payload bits per byte, least significant group first, with the high
//! bit set on every byte except the last. Signed values are zigzag-mapped
//! first so small negative numbers stay short.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use crate::error::{LucernaError, Result};

/// Write `value` as a varint, returning the number of bytes written.
pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let mut buf = [0u8; 10];
    let mut len = 0;
    let mut val = value;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if val == 0 {
            break;
        }
    }

    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Read a varint written by [`write_u64`].
pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = reader.read_u8()?;
        if shift >= 64 || (shift == 63 && (byte & 0x7F) > 1) {
            return Err(LucernaError::corrupt("varint overflows 64 bits"));
        }

        result |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<usize> {
    write_u64(writer, value as u64)
}

pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let value = read_u64(reader)?;
    u32::try_from(value).map_err(|_| LucernaError::corrupt("varint overflows 32 bits"))
}

/// Write a signed value using zigzag encoding.
pub fn write_i64<W: Write>(writer: &mut W, value: i64) -> Result<usize> {
    write_u64(writer, ((value << 1) ^ (value >> 63)) as u64)
}

pub fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let raw = read_u64(reader)?;
    Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
}
