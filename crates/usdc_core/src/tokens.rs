//! The TOKENS and STRINGS sections.
//!
//! TOKENS holds every token of the file as one compressed block of
//! NUL-terminated strings:
//!
//! ```text
//! u64 count | u64 uncompressed size | u64 compressed size | compressed bytes
//! ```
//!
//! The compressed bytes use the chunked fast-compression framing parsed by
//! [`BlockFrame`]. Block decoding itself is delegated to a [`Decompressor`].
//!
//! STRINGS is an uncompressed table of `u32` indices into the tokens.

use serde::Serialize;

use crate::bootstrap::Version;
use crate::config::ReaderConfig;
use crate::error::{CrateError, CrateResult};
use crate::reader::ContainerReader;
use crate::source::ByteSource;
use crate::toc::{SectionKind, TableOfContents};

/// Largest input a single compressed chunk may expand to.
pub const MAX_CHUNK_SIZE: usize = 0x7E00_0000;

/// Decodes one compressed block.
pub trait Decompressor {
    /// Decompress `input`, producing at most `max_output` bytes.
    fn decompress_block(&self, input: &[u8], max_output: usize) -> CrateResult<Vec<u8>>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8], usize) -> CrateResult<Vec<u8>>,
{
    fn decompress_block(&self, input: &[u8], max_output: usize) -> CrateResult<Vec<u8>> {
        self(input, max_output)
    }
}

/// Chunks of a framed compressed buffer.
///
/// The first byte is the chunk count. Zero means the rest of the buffer is a
/// single block; otherwise every chunk is an `i32` length followed by that
/// many bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct BlockFrame<'a> {
    pub chunks: Vec<&'a [u8]>,
}

impl<'a> BlockFrame<'a> {
    pub fn parse(payload: &'a [u8]) -> CrateResult<Self> {
        let (&num_chunks, mut rest) = payload
            .split_first()
            .ok_or_else(|| CrateError::Decompression("empty compressed buffer".into()))?;

        if num_chunks == 0 {
            return Ok(Self { chunks: vec![rest] });
        }

        let mut chunks = Vec::with_capacity(num_chunks as usize);
        for i in 0..num_chunks {
            if rest.len() < 4 {
                return Err(CrateError::Decompression(format!(
                    "chunk {} length is truncated",
                    i
                )));
            }
            let (len_bytes, tail) = rest.split_at(4);
            let len = i32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
            if len <= 0 || len as usize > tail.len() {
                return Err(CrateError::Decompression(format!(
                    "chunk {} has invalid length {} ({} bytes left)",
                    i,
                    len,
                    tail.len()
                )));
            }
            let (chunk, tail) = tail.split_at(len as usize);
            chunks.push(chunk);
            rest = tail;
        }

        Ok(Self { chunks })
    }

    /// Decompress every chunk and concatenate the output.
    pub fn decompress<D: Decompressor + ?Sized>(
        &self,
        decompressor: &D,
        expected_size: usize,
    ) -> CrateResult<Vec<u8>> {
        // Grows with the real output; `expected_size` comes from the file.
        let mut out = Vec::new();
        for chunk in &self.chunks {
            let budget = expected_size.saturating_sub(out.len()).min(MAX_CHUNK_SIZE);
            let block = decompressor.decompress_block(chunk, budget)?;
            if block.len() > budget {
                return Err(CrateError::Decompression(format!(
                    "chunk expanded to {} bytes, budget was {}",
                    block.len(),
                    budget
                )));
            }
            out.extend_from_slice(&block);
        }
        Ok(out)
    }
}

/// Sizes recorded at the start of the TOKENS section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TokensHeader {
    pub count: u64,
    pub uncompressed_size: u64,
    pub compressed_size: u64,

    /// Absolute offset of the compressed bytes.
    pub payload_offset: u64,
}

fn corrupt(reason: impl Into<String>) -> CrateError {
    CrateError::CorruptTokens(reason.into())
}

/// Read and check the TOKENS section header.
pub fn read_tokens_header<S: ByteSource>(
    reader: &ContainerReader<S>,
    toc: &TableOfContents,
    version: Version,
    config: &ReaderConfig,
) -> CrateResult<TokensHeader> {
    if version < Version::MIN_SUPPORTED {
        return Err(CrateError::UnsupportedVersion(version));
    }

    let section = toc
        .find(SectionKind::Tokens)
        .ok_or(CrateError::MissingSection(SectionKind::Tokens.name()))?;
    if section.size < 4 {
        return Err(corrupt("section data size is zero or too small"));
    }

    let mut cursor = reader.cursor_at(section.start);
    let count = cursor.read_u64_le()?;
    if count == 0 {
        return Err(corrupt("empty tokens"));
    }
    if count > config.max_num_tokens {
        return Err(corrupt(format!(
            "too many tokens: {} (limit {})",
            count, config.max_num_tokens
        )));
    }

    let uncompressed_size = cursor.read_u64_le()?;
    // Smallest payload: a NUL per token plus the 3 byte ";-)" placeholder.
    if uncompressed_size < 4 || uncompressed_size < count.saturating_add(3) {
        return Err(corrupt(format!(
            "uncompressed size {} too small for {} tokens",
            uncompressed_size, count
        )));
    }

    let compressed_size = cursor.read_u64_le()?;
    if compressed_size < 4 {
        return Err(corrupt("compressed size is too small or zero"));
    }
    if compressed_size > reader.len() {
        return Err(corrupt("compressed size exceeds input size"));
    }
    if compressed_size > section.size {
        return Err(corrupt("compressed size exceeds section size"));
    }

    // Compressed and decompressed buffers live side by side, plus slack for
    // the block decoder's wide copies.
    let working_set = compressed_size
        .max(uncompressed_size)
        .saturating_add(128)
        .saturating_add(uncompressed_size);
    if working_set > config.max_memory_budget {
        return Err(corrupt(format!(
            "decoding needs {} bytes, over the memory budget of {}",
            working_set, config.max_memory_budget
        )));
    }

    let header = TokensHeader {
        count,
        uncompressed_size,
        compressed_size,
        payload_offset: cursor.position(),
    };
    log::debug!("{:?}", header);
    Ok(header)
}

/// Read, decompress and split the tokens described by `header`.
pub fn read_tokens<S: ByteSource, D: Decompressor + ?Sized>(
    reader: &ContainerReader<S>,
    header: &TokensHeader,
    decompressor: &D,
) -> CrateResult<Vec<String>> {
    let compressed_len = usize::try_from(header.compressed_size)
        .map_err(|_| corrupt("compressed size does not fit in memory"))?;
    let uncompressed_len = usize::try_from(header.uncompressed_size)
        .map_err(|_| corrupt("uncompressed size does not fit in memory"))?;

    let compressed = reader.read_bytes_at(header.payload_offset, compressed_len)?;
    let chars = BlockFrame::parse(&compressed)?.decompress(decompressor, uncompressed_len)?;
    if chars.len() != uncompressed_len {
        return Err(corrupt(format!(
            "decompressed {} bytes, expected {}",
            chars.len(),
            uncompressed_len
        )));
    }

    split_tokens(&chars, header.count)
}

/// Split a buffer of NUL-terminated strings into exactly `count` tokens.
///
/// Empty tokens are allowed. Invalid UTF-8 is kept with replacement
/// characters. Stops early if the buffer is exhausted.
pub fn split_tokens(chars: &[u8], count: u64) -> CrateResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut rest = chars;

    for _ in 0..count {
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("unterminated token string"))?;
        let raw = &rest[..len];
        let token = String::from_utf8_lossy(raw);
        if matches!(token, std::borrow::Cow::Owned(_)) {
            log::warn!("token {} is not valid UTF-8, replacing invalid bytes", tokens.len());
        }
        tokens.push(token.into_owned());
        rest = &rest[len + 1..];

        if rest.is_empty() {
            break;
        }
    }

    if tokens.len() as u64 != count {
        return Err(corrupt(format!(
            "parsed {} tokens, header declares {}",
            tokens.len(),
            count
        )));
    }
    Ok(tokens)
}

/// Read the STRINGS index table. A missing or empty section yields no indices.
pub fn read_string_indices<S: ByteSource>(
    reader: &ContainerReader<S>,
    toc: &TableOfContents,
    config: &ReaderConfig,
) -> CrateResult<Vec<u32>> {
    let section = match toc.find(SectionKind::Strings) {
        Some(section) if section.size > 0 => section,
        _ => return Ok(Vec::new()),
    };

    let mut cursor = reader.cursor_at(section.start);
    let count = cursor.read_u64_le()?;
    if count > config.max_num_indices {
        return Err(CrateError::CorruptStrings(format!(
            "too many indices: {} (limit {})",
            count, config.max_num_indices
        )));
    }
    let data_len = count.saturating_mul(4);
    if data_len > section.size.saturating_sub(8) {
        return Err(CrateError::CorruptStrings(format!(
            "{} indices do not fit in a {} byte section",
            count, section.size
        )));
    }

    let raw = cursor.read_bytes(data_len as usize)?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Map string indices to their tokens.
pub fn resolve_strings(indices: &[u32], tokens: &[String]) -> CrateResult<Vec<String>> {
    indices
        .iter()
        .map(|&index| {
            tokens.get(index as usize).cloned().ok_or_else(|| {
                CrateError::CorruptStrings(format!(
                    "index {} out of range for {} tokens",
                    index,
                    tokens.len()
                ))
            })
        })
        .collect()
}
