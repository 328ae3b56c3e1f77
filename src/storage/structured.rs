//! Structured binary I/O for index files.
//!
//! [`StructWriter`] writes little-endian fixed-width values, varints and
//! length-prefixed strings while feeding every byte into a CRC32. Closing the
//! writer appends the checksum as a 4-byte footer. [`StructReader`] loads a
//! file, verifies the footer before anything is decoded, and then reads the
//! values back in the same order.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{LucernaError, Result};
use crate::storage::{StorageInput, StorageOutput};
use crate::util::varint;

/// Checksummed writer over a storage output.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: Hasher::new(),
            position: 0,
        }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value])
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let mut buf = Vec::with_capacity(10);
        varint::write_u64(&mut buf, value)?;
        self.put(&buf)
    }

    /// Zigzag varint.
    pub fn write_signed_varint(&mut self, value: i64) -> Result<()> {
        let mut buf = Vec::with_capacity(10);
        varint::write_i64(&mut buf, value)?;
        self.put(&buf)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.put(value)
    }

    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.put(value)
    }

    /// Write an ascending sequence as a count followed by gaps.
    pub fn write_delta_compressed_u64s(&mut self, values: &[u64]) -> Result<()> {
        self.write_varint(values.len() as u64)?;

        let mut previous = 0u64;
        for &value in values {
            if value < previous {
                return Err(LucernaError::invalid_argument(
                    "delta-compressed values must be ascending",
                ));
            }
            self.write_varint(value - previous)?;
            previous = value;
        }
        Ok(())
    }

    pub fn write_delta_compressed_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.write_varint(values.len() as u64)?;

        let mut previous = 0u32;
        for &value in values {
            if value < previous {
                return Err(LucernaError::invalid_argument(
                    "delta-compressed values must be ascending",
                ));
            }
            self.write_varint((value - previous) as u64)?;
            previous = value;
        }
        Ok(())
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Checksum of everything written so far.
    pub fn checksum(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Append the checksum footer, sync, and publish the file.
    ///
    /// Returns the checksum that was written.
    pub fn close(mut self) -> Result<u32> {
        let checksum = self.checksum();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush_and_sync()?;
        self.writer.close()?;
        Ok(checksum)
    }
}

/// Reader for files produced by [`StructWriter`].
#[derive(Debug)]
pub struct StructReader {
    cursor: Cursor<Vec<u8>>,
    body_len: u64,
    checksum: u32,
}

impl StructReader {
    /// Load the whole input and verify its checksum footer.
    pub fn new<R: StorageInput>(mut reader: R) -> Result<Self> {
        let mut data = Vec::with_capacity(reader.size()? as usize);
        reader.read_to_end(&mut data)?;

        if data.len() < 4 {
            return Err(LucernaError::corrupt("file too short for checksum"));
        }

        let body_len = data.len() - 4;
        let mut footer = &data[body_len..];
        let stored = footer.read_u32::<LittleEndian>()?;
        let actual = crc32fast::hash(&data[..body_len]);
        if stored != actual {
            return Err(LucernaError::corrupt(format!(
                "checksum mismatch: stored {stored:#010x}, computed {actual:#010x}"
            )));
        }

        data.truncate(body_len);
        Ok(StructReader {
            cursor: Cursor::new(data),
            body_len: body_len as u64,
            checksum: stored,
        })
    }

    fn truncated<T>(&self, what: &str) -> Result<T> {
        Err(LucernaError::corrupt(format!(
            "unexpected end of data reading {what} at byte {}",
            self.cursor.position()
        )))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        match self.cursor.read_u8() {
            Ok(v) => Ok(v),
            Err(_) => self.truncated("u8"),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        match self.cursor.read_u32::<LittleEndian>() {
            Ok(v) => Ok(v),
            Err(_) => self.truncated("u32"),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        match self.cursor.read_u64::<LittleEndian>() {
            Ok(v) => Ok(v),
            Err(_) => self.truncated("u64"),
        }
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        match self.cursor.read_f64::<LittleEndian>() {
            Ok(v) => Ok(v),
            Err(_) => self.truncated("f64"),
        }
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        match varint::read_u64(&mut self.cursor) {
            Ok(v) => Ok(v),
            Err(LucernaError::Io(_)) => self.truncated("varint"),
            Err(e) => Err(e),
        }
    }

    pub fn read_signed_varint(&mut self) -> Result<i64> {
        match varint::read_i64(&mut self.cursor) {
            Ok(v) => Ok(v),
            Err(LucernaError::Io(_)) => self.truncated("varint"),
            Err(e) => Err(e),
        }
    }

    /// Read a length prefix and check it fits in the remaining bytes.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_varint()?;
        if len > self.remaining() {
            return Err(LucernaError::corrupt(format!(
                "length {len} exceeds remaining {} bytes",
                self.remaining()
            )));
        }
        Ok(len as usize)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        let mut bytes = vec![0u8; len];
        self.cursor.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| LucernaError::corrupt(format!("Invalid UTF-8: {e}")))
    }

    pub fn read_raw(&mut self, length: usize) -> Result<Vec<u8>> {
        if length as u64 > self.remaining() {
            return self.truncated("raw bytes");
        }
        let mut bytes = vec![0u8; length];
        self.cursor.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_delta_compressed_u64s(&mut self) -> Result<Vec<u64>> {
        let len = self.read_len()?;
        let mut values = Vec::with_capacity(len);

        let mut previous = 0u64;
        for _ in 0..len {
            let delta = self.read_varint()?;
            let value = previous
                .checked_add(delta)
                .ok_or_else(|| LucernaError::corrupt("delta sequence overflows u64"))?;
            values.push(value);
            previous = value;
        }
        Ok(values)
    }

    pub fn read_delta_compressed_u32s(&mut self) -> Result<Vec<u32>> {
        let len = self.read_len()?;
        let mut values = Vec::with_capacity(len);

        let mut previous = 0u32;
        for _ in 0..len {
            let delta = u32::try_from(self.read_varint()?)
                .map_err(|_| LucernaError::corrupt("delta overflows u32"))?;
            let value = previous
                .checked_add(delta)
                .ok_or_else(|| LucernaError::corrupt("delta sequence overflows u32"))?;
            values.push(value);
            previous = value;
        }
        Ok(values)
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> u64 {
        self.body_len.saturating_sub(self.cursor.position())
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// The verified footer checksum.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}
