//! Offset-tracked little-endian reader over an immutable byte buffer

use glam::Vec3;

use crate::error::DecodeError;

/// Sequential reader over a borrowed byte slice
///
/// Every read names the field it decodes so a short read can report exactly
/// what was being decoded and where.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the offset and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Move the offset to an absolute position (may be equal to `len`)
    pub fn seek(&mut self, offset: usize) -> Result<(), DecodeError> {
        if offset > self.data.len() {
            return Err(DecodeError::OutOfBounds {
                offset,
                len: self.data.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Skip `count` bytes without interpreting them
    pub fn advance(&mut self, count: usize, field: &'static str) -> Result<(), DecodeError> {
        self.read_bytes(count, field).map(|_| ())
    }

    /// Borrow the next `count` bytes
    pub fn read_bytes(&mut self, count: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if count > available {
            return Err(DecodeError::UnexpectedEof {
                field,
                offset: self.offset,
                needed: count,
                available,
            });
        }
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N, field)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        self.read_array(field).map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        self.read_array(field).map(u32::from_le_bytes)
    }

    pub fn read_f32(&mut self, field: &'static str) -> Result<f32, DecodeError> {
        self.read_array(field).map(f32::from_le_bytes)
    }

    /// Three consecutive `f32` values
    pub fn read_vec3(&mut self, field: &'static str) -> Result<Vec3, DecodeError> {
        let x = self.read_f32(field)?;
        let y = self.read_f32(field)?;
        let z = self.read_f32(field)?;
        Ok(Vec3::new(x, y, z))
    }

    /// Raw bytes of a `u32` length-prefixed string
    ///
    /// The bytes are not necessarily null-terminated; the caller picks the
    /// encoding.
    pub fn read_prefixed_bytes(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let length = self.read_u32(field)? as usize;
        self.read_bytes(length, field)
    }

    /// Length-prefixed string decoded as UTF-8, invalid sequences replaced
    pub fn read_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let bytes = self.read_prefixed_bytes(field)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
