//! Byte sources the decoder reads from.
//!
//! A [`ByteSource`] is an immutable, randomly addressable run of bytes with a
//! known length. The decoder never mutates it and never assumes it lives in
//! memory: it may be a slice, a file, or any other positional store.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only, length-bounded, randomly addressable byte sequence.
///
/// Implementations must be safe to share between threads; positional reads
/// take `&self` and must not depend on a shared cursor.
pub trait ByteSource: Send + Sync {
    /// Total length in bytes.
    fn byte_len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the range runs past the end.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

fn eof(offset: u64, wanted: usize, len: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("{} bytes at offset {} exceed length {}", wanted, offset, len),
    )
}

impl ByteSource for [u8] {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let len = self.len() as u64;
        let start = usize::try_from(offset).map_err(|_| eof(offset, buf.len(), len))?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= self.len())
            .ok_or_else(|| eof(offset, buf.len(), len))?;
        buf.copy_from_slice(&self[start..end]);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_exact_at(offset, buf)
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn byte_len(&self) -> u64 {
        N as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_exact_at(offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn byte_len(&self) -> u64 {
        (**self).byte_len()
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_at(offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    fn byte_len(&self) -> u64 {
        (**self).byte_len()
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_at(offset, buf)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn byte_len(&self) -> u64 {
        (**self).byte_len()
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_at(offset, buf)
    }
}

/// A file on disk read with positional I/O.
///
/// The length is captured when the file is opened.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
    path: PathBuf,
}

impl FileSource {
    /// Open a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        log::debug!("Opened {} ({} bytes)", path.display(), len);
        Ok(Self {
            file,
            len,
            path: path.to_path_buf(),
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn byte_len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        use std::os::unix::fs::FileExt;

        if offset.saturating_add(buf.len() as u64) > self.len {
            return Err(eof(offset, buf.len(), self.len));
        }
        self.file.read_exact_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        use std::os::windows::fs::FileExt;

        if offset.saturating_add(buf.len() as u64) > self.len {
            return Err(eof(offset, buf.len(), self.len));
        }
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.seek_read(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => return Err(eof(offset, buf.len(), self.len)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    #[cfg(not(any(unix, windows)))]
    fn read_exact_at(&self, _offset: u64, _buf: &mut [u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "positional file reads are not available on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_reads() {
        let data: &[u8] = &[1, 2, 3, 4];
        let mut buf = [0u8; 2];
        data.read_exact_at(1, &mut buf).unwrap();
        assert_eq!(buf, [2, 3]);

        let mut buf = [0u8; 2];
        let err = data.read_exact_at(3, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_offset_overflow_is_eof() {
        let data = vec![0u8; 4];
        let mut buf = [0u8; 1];
        let err = data.read_exact_at(u64::MAX, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_wrappers_share_length() {
        let data = Arc::new(vec![9u8; 16]);
        let boxed: Box<dyn ByteSource> = Box::new(data.clone());
        assert_eq!(data.byte_len(), 16);
        assert_eq!(boxed.byte_len(), 16);
        assert_eq!([0u8; 0].byte_len(), 0);
    }

    #[test]
    fn test_array_len_stays_usize() {
        let magic = *b"PXR-USDC";
        let len: usize = magic.len();
        assert_eq!(&magic[..len - 1], b"PXR-USD");
        assert_eq!(magic.byte_len(), 8u64);
    }

    #[test]
    fn test_file_source() {
        let path = std::env::temp_dir().join(format!("usdc_source_{}.bin", std::process::id()));
        std::fs::write(&path, b"PXR-USDC\x00\x08").unwrap();

        let source = FileSource::open(&path).unwrap();
        assert_eq!(source.byte_len(), 10);
        assert_eq!(source.path(), path.as_path());

        let mut buf = [0u8; 4];
        source.read_exact_at(4, &mut buf).unwrap();
        assert_eq!(&buf, b"USDC");
        assert!(source.read_exact_at(8, &mut buf).is_err());

        std::fs::remove_file(&path).ok();
    }
}
