//! Data output abstractions and implementations
//!
//! Little-endian writers used by the wire encoder: an in-memory buffer and an
//! adapter over any [`std::io::Write`].

use std::io::Write;

use crate::error::Result;

/// Trait for writing little-endian structured data
pub trait DataOutput {
    /// Write a single byte
    fn write_u8(&mut self, value: u8) -> Result<()>;

    /// Write a 16-bit unsigned integer in little-endian format
    fn write_u16(&mut self, value: u16) -> Result<()>;

    /// Write a 32-bit unsigned integer in little-endian format
    fn write_u32(&mut self, value: u32) -> Result<()>;

    /// Write a 64-bit unsigned integer in little-endian format
    fn write_u64(&mut self, value: u64) -> Result<()>;

    /// Write bytes from the provided buffer
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Flush any buffered data to the underlying destination
    fn flush(&mut self) -> Result<()>;

    /// Write a signed 16-bit integer in little-endian format
    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_u16(value as u16)
    }

    /// Write a length-prefixed byte slice (length as u64)
    fn write_length_prefixed_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_u64(data.len() as u64)?;
        self.write_bytes(data)
    }
}

/// DataOutput implementation for Vec<u8>
pub struct VecDataOutput {
    data: Vec<u8>,
}

impl VecDataOutput {
    /// Create a new VecDataOutput
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a new VecDataOutput with the specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of bytes written
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no bytes have been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to the underlying data
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Convert into the underlying Vec<u8>
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Default for VecDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DataOutput for VecDataOutput {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.data.push(value);
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// DataOutput implementation for any Write implementation
pub struct WriterDataOutput<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> WriterDataOutput<W> {
    /// Create a new WriterDataOutput
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Get the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DataOutput for WriterDataOutput<W> {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Convenience function to create a VecDataOutput
pub fn to_vec() -> VecDataOutput {
    VecDataOutput::new()
}

/// Convenience function to wrap a writer
pub fn to_writer<W: Write>(writer: W) -> WriterDataOutput<W> {
    WriterDataOutput::new(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_output_little_endian() -> Result<()> {
        let mut out = to_vec();
        out.write_u8(0x01)?;
        out.write_u16(0x1234)?;
        out.write_u32(0x12345678)?;
        out.write_i16(-1)?;
        assert_eq!(
            out.as_slice(),
            &[0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff, 0xff]
        );
        assert_eq!(out.len(), 9);
        Ok(())
    }

    #[test]
    fn test_length_prefixed() -> Result<()> {
        let mut out = VecDataOutput::with_capacity(16);
        out.write_length_prefixed_bytes(b"ab")?;
        assert_eq!(out.into_vec(), vec![2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b']);
        Ok(())
    }

    #[test]
    fn test_writer_output() -> Result<()> {
        let mut out = to_writer(Vec::new());
        out.write_u64(7)?;
        out.write_bytes(b"xyz")?;
        out.flush()?;
        assert_eq!(out.bytes_written(), 11);
        let bytes = out.into_inner();
        assert_eq!(&bytes[8..], b"xyz");
        Ok(())
    }
}
