//! Magic header validation.
//!
//! A crate file starts with the 8 ASCII bytes `PXR-USDC`. Validation reads
//! exactly those 8 bytes through a [`ContainerReader`] and compares them
//! element-wise against [`MAGIC`].

use crate::bootstrap::BOOTSTRAP_SIZE;
use crate::error::{CrateError, CrateResult};
use crate::reader::ContainerReader;
use crate::source::ByteSource;

/// Magic signature at offset 0 of every crate file.
pub const MAGIC: [u8; 8] = *b"PXR-USDC";

/// Reason attached to [`ValidationResult::Invalid`] on a signature mismatch.
pub const BAD_MAGIC_REASON: &str = "bad magic header";

/// Outcome of validating a header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// The signature matched.
    Valid,

    /// The input was long enough but not a crate file.
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Human-readable reason, if invalid.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(reason) => Some(reason),
        }
    }
}

/// Validate the magic header of a byte source.
///
/// Sources shorter than 8 bytes fail with [`CrateError::TruncatedInput`].
pub fn validate<S: ByteSource>(source: S) -> CrateResult<ValidationResult> {
    validate_reader(&ContainerReader::new(source))
}

/// Validate the magic header through an existing reader.
pub fn validate_reader<S: ByteSource>(reader: &ContainerReader<S>) -> CrateResult<ValidationResult> {
    if reader.len() < MAGIC.len() as u64 {
        log::warn!("Input of {} bytes is too short for a magic header", reader.len());
        return Err(CrateError::TruncatedInput { len: reader.len() });
    }

    for (offset, &expected) in MAGIC.iter().enumerate() {
        let byte = reader.read_byte_at(offset as u64)?;
        if byte != expected {
            log::debug!(
                "Magic mismatch at byte {}: expected {:#04x}, got {:#04x}",
                offset,
                expected,
                byte
            );
            return Ok(ValidationResult::Invalid(BAD_MAGIC_REASON.to_string()));
        }
    }

    Ok(ValidationResult::Valid)
}

/// Quick check used before attempting a full read.
///
/// True only when the source holds at least a full bootstrap header and the
/// magic validates. Never errors.
pub fn is_usdc<S: ByteSource>(source: S) -> bool {
    if source.byte_len() < BOOTSTRAP_SIZE {
        return false;
    }
    matches!(validate(source), Ok(ValidationResult::Valid))
}
