//! Bounded little-endian reads over a [`ByteSource`].
//!
//! Every accessor checks `offset + n <= len` before touching the source and
//! reports [`CrateError::OutOfBounds`] otherwise. Nothing is clamped.

use crate::error::{CrateError, CrateResult};
use crate::source::ByteSource;

/// Stateless, bounds-checked accessor over a byte source.
#[derive(Debug, Clone)]
pub struct ContainerReader<S> {
    source: S,
    len: u64,
}

impl<S: ByteSource> ContainerReader<S> {
    /// Wrap a byte source.
    pub fn new(source: S) -> Self {
        let len = source.byte_len();
        Self { source, len }
    }

    /// Length of the underlying source.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the underlying source is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Unwrap the reader, returning the source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Check that `n` bytes starting at `offset` lie within the source.
    pub fn check_range(&self, offset: u64, n: u64) -> CrateResult<()> {
        match offset.checked_add(n) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(CrateError::OutOfBounds {
                offset,
                len: self.len,
            }),
        }
    }

    /// Read the byte at `offset`; requires `offset < len`.
    pub fn read_byte_at(&self, offset: u64) -> CrateResult<u8> {
        let [byte] = self.read_array::<1>(offset)?;
        Ok(byte)
    }

    /// Read exactly `N` bytes starting at `offset`.
    pub fn read_array<const N: usize>(&self, offset: u64) -> CrateResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Read `n` bytes starting at `offset` into a new buffer.
    pub fn read_bytes_at(&self, offset: u64, n: usize) -> CrateResult<Vec<u8>> {
        // Bounds first so a corrupt length never drives the allocation.
        self.check_range(offset, n as u64)?;
        let mut buf = vec![0u8; n];
        self.fill_at(offset, &mut buf)?;
        Ok(buf)
    }

    pub fn read_u32_le_at(&self, offset: u64) -> CrateResult<u32> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    pub fn read_u64_le_at(&self, offset: u64) -> CrateResult<u64> {
        self.read_array(offset).map(u64::from_le_bytes)
    }

    pub fn read_i32_le_at(&self, offset: u64) -> CrateResult<i32> {
        self.read_array(offset).map(i32::from_le_bytes)
    }

    pub fn read_i64_le_at(&self, offset: u64) -> CrateResult<i64> {
        self.read_array(offset).map(i64::from_le_bytes)
    }

    pub fn read_f32_le_at(&self, offset: u64) -> CrateResult<f32> {
        self.read_array(offset).map(f32::from_le_bytes)
    }

    pub fn read_f64_le_at(&self, offset: u64) -> CrateResult<f64> {
        self.read_array(offset).map(f64::from_le_bytes)
    }

    /// Sequential cursor starting at `offset`.
    pub fn cursor_at(&self, offset: u64) -> Cursor<'_, S> {
        Cursor {
            reader: self,
            pos: offset,
        }
    }

    fn fill_at(&self, offset: u64, buf: &mut [u8]) -> CrateResult<()> {
        self.check_range(offset, buf.len() as u64)?;
        if buf.is_empty() {
            return Ok(());
        }
        self.source.read_exact_at(offset, buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CrateError::OutOfBounds {
                    offset,
                    len: self.len,
                }
            } else {
                CrateError::Io(e)
            }
        })
    }
}

/// A read position over a [`ContainerReader`].
///
/// The position only advances after a successful read.
#[derive(Debug)]
pub struct Cursor<'a, S> {
    reader: &'a ContainerReader<S>,
    pos: u64,
}

impl<'a, S: ByteSource> Cursor<'a, S> {
    /// Current absolute offset.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes left between the position and the end of the source.
    pub fn remaining(&self) -> u64 {
        self.reader.len().saturating_sub(self.pos)
    }

    pub fn read_array<const N: usize>(&mut self) -> CrateResult<[u8; N]> {
        let bytes = self.reader.read_array::<N>(self.pos)?;
        self.pos += N as u64;
        Ok(bytes)
    }

    pub fn read_bytes(&mut self, n: usize) -> CrateResult<Vec<u8>> {
        let bytes = self.reader.read_bytes_at(self.pos, n)?;
        self.pos += n as u64;
        Ok(bytes)
    }

    pub fn read_u32_le(&mut self) -> CrateResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> CrateResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64_le(&mut self) -> CrateResult<i64> {
        self.read_array().map(i64::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_byte_boundary() {
        let reader = ContainerReader::new(vec![0u8, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(reader.read_byte_at(7).unwrap(), 7);
        assert!(matches!(
            reader.read_byte_at(8),
            Err(CrateError::OutOfBounds { offset: 8, len: 8 })
        ));
    }

    #[test]
    fn test_empty_source_rejects_every_byte() {
        let reader = ContainerReader::new(Vec::new());
        assert!(reader.is_empty());
        assert!(matches!(
            reader.read_byte_at(0),
            Err(CrateError::OutOfBounds { offset: 0, len: 0 })
        ));
    }

    #[test]
    fn test_little_endian_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0403_0201u32.to_le_bytes());
        data.extend_from_slice(&(-2i64).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-0.25f64).to_le_bytes());
        let reader = ContainerReader::new(data);

        assert_eq!(reader.read_u32_le_at(0).unwrap(), 0x0403_0201);
        assert_eq!(reader.read_byte_at(0).unwrap(), 0x01);
        assert_eq!(reader.read_i64_le_at(4).unwrap(), -2);
        assert_eq!(reader.read_u64_le_at(4).unwrap(), u64::MAX - 1);
        assert_eq!(reader.read_f32_le_at(12).unwrap(), 1.5);
        assert_eq!(reader.read_f64_le_at(16).unwrap(), -0.25);
        assert!(reader.read_f64_le_at(17).is_err());
    }

    #[test]
    fn test_overflowing_offset() {
        let reader = ContainerReader::new(vec![0u8; 16]);
        assert!(matches!(
            reader.read_u64_le_at(u64::MAX - 3),
            Err(CrateError::OutOfBounds { .. })
        ));
        assert!(reader.read_bytes_at(8, usize::MAX).is_err());
    }

    #[test]
    fn test_cursor_advances_only_on_success() {
        let mut data = 7u64.to_le_bytes().to_vec();
        data.extend_from_slice(&[1, 2, 3]);
        let reader = ContainerReader::new(data);
        let mut cursor = reader.cursor_at(0);

        assert_eq!(cursor.read_u64_le().unwrap(), 7);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.remaining(), 3);

        assert!(cursor.read_u32_le().is_err());
        assert_eq!(cursor.position(), 8);

        assert_eq!(cursor.read_bytes(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_reads_are_deterministic() {
        let reader = ContainerReader::new(&b"PXR-USDC"[..]);
        let first = reader.read_array::<8>(0).unwrap();
        let second = reader.read_array::<8>(0).unwrap();
        assert_eq!(first, second);
    }
}
