//! The fixed-size bootstrap header at the start of a crate file.
//!
//! Layout (little-endian):
//!
//! | Offset | Length | Meaning |
//! |---|---|---|
//! | 0 | 8 | magic `PXR-USDC` |
//! | 8 | 8 | version; bytes 0..3 are major, minor, patch |
//! | 16 | 8 | TOC offset (i64) |
//! | 24 | 64 | reserved |

use std::fmt;

use serde::Serialize;

use crate::error::{CrateError, CrateResult};
use crate::header::{validate_reader, ValidationResult};
use crate::reader::ContainerReader;
use crate::source::ByteSource;

/// Size of the bootstrap header in bytes.
pub const BOOTSTRAP_SIZE: u64 = 88;

const VERSION_OFFSET: u64 = 8;
const TOC_OFFSET_OFFSET: u64 = 16;

/// Crate file format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    /// Oldest version this reader accepts. Tokens are compressed from here on.
    pub const MIN_SUPPORTED: Version = Version::new(0, 4, 0);

    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    /// Whether this reader understands the layout of this version.
    ///
    /// Accepts `0.4.0` up to and including every `0.9.x`.
    pub fn is_supported(&self) -> bool {
        *self >= Self::MIN_SUPPORTED && self.major == 0 && self.minor < 10
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parsed bootstrap header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bootstrap {
    pub version: Version,

    /// Absolute offset of the table of contents.
    pub toc_offset: u64,
}

/// Read and check the bootstrap header.
pub fn read_bootstrap<S: ByteSource>(reader: &ContainerReader<S>) -> CrateResult<Bootstrap> {
    match validate_reader(reader)? {
        ValidationResult::Valid => {}
        ValidationResult::Invalid(reason) => {
            log::warn!("Rejecting input: {}", reason);
            return Err(CrateError::BadMagic);
        }
    }

    if reader.len() < BOOTSTRAP_SIZE {
        return Err(CrateError::TruncatedInput { len: reader.len() });
    }

    let [major, minor, patch] = reader.read_array::<3>(VERSION_OFFSET)?;
    let version = Version::new(major, minor, patch);
    log::debug!("Crate version {}", version);
    if !version.is_supported() {
        return Err(CrateError::UnsupportedVersion(version));
    }

    let toc_offset = reader.read_i64_le_at(TOC_OFFSET_OFFSET)?;
    if toc_offset <= BOOTSTRAP_SIZE as i64 || toc_offset as i128 >= reader.len() as i128 {
        return Err(CrateError::InvalidTocOffset {
            offset: toc_offset,
            len: reader.len(),
        });
    }
    log::debug!("TOC offset {}", toc_offset);

    Ok(Bootstrap {
        version,
        toc_offset: toc_offset as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MAGIC;

    fn header(version: [u8; 3], toc_offset: i64, total_len: usize) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&version);
        data.extend_from_slice(&[0; 5]);
        data.extend_from_slice(&toc_offset.to_le_bytes());
        data.resize(total_len, 0);
        data
    }

    fn read(data: Vec<u8>) -> CrateResult<Bootstrap> {
        read_bootstrap(&ContainerReader::new(data))
    }

    #[test]
    fn test_read_bootstrap() {
        let bootstrap = read(header([0, 8, 0], 96, 128)).unwrap();
        assert_eq!(bootstrap.version, Version::new(0, 8, 0));
        assert_eq!(bootstrap.toc_offset, 96);
    }

    #[test]
    fn test_version_ordering_and_display() {
        assert!(Version::new(0, 10, 0) > Version::new(0, 9, 9));
        assert_eq!(Version::new(0, 7, 1).to_string(), "0.7.1");
        assert!(Version::new(0, 4, 0).is_supported());
        assert!(Version::new(0, 9, 3).is_supported());
        assert!(!Version::new(0, 3, 9).is_supported());
        assert!(!Version::new(0, 10, 0).is_supported());
        assert!(!Version::new(1, 0, 0).is_supported());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = header([0, 8, 0], 96, 128);
        data[3] = b'_';
        assert!(matches!(read(data), Err(CrateError::BadMagic)));
    }

    #[test]
    fn test_rejects_short_header() {
        let data = header([0, 8, 0], 96, 40);
        assert!(matches!(read(data), Err(CrateError::TruncatedInput { len: 40 })));
        assert!(matches!(read(b"PXR".to_vec()), Err(CrateError::TruncatedInput { len: 3 })));
    }

    #[test]
    fn test_rejects_old_and_new_versions() {
        assert!(matches!(
            read(header([0, 3, 2], 96, 128)),
            Err(CrateError::UnsupportedVersion(v)) if v == Version::new(0, 3, 2)
        ));
        assert!(matches!(
            read(header([0, 10, 0], 96, 128)),
            Err(CrateError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_rejects_toc_offset_out_of_range() {
        for offset in [-1i64, 0, 88, 128, i64::MAX] {
            assert!(
                matches!(
                    read(header([0, 8, 0], offset, 128)),
                    Err(CrateError::InvalidTocOffset { .. })
                ),
                "offset {}",
                offset
            );
        }
        assert!(read(header([0, 8, 0], 89, 128)).is_ok());
        assert!(read(header([0, 8, 0], 127, 128)).is_ok());
    }
}
