//! Table of contents: the section table located by the bootstrap header.

use std::fmt;

use serde::Serialize;

use crate::bootstrap::Bootstrap;
use crate::config::ReaderConfig;
use crate::error::{CrateError, CrateResult};
use crate::reader::ContainerReader;
use crate::source::ByteSource;

/// Longest section name, excluding the NUL terminator.
pub const SECTION_NAME_MAX_LEN: usize = 15;

/// On-disk size of one section record: name, start, size.
pub const SECTION_RECORD_SIZE: u64 = (SECTION_NAME_MAX_LEN as u64 + 1) + 8 + 8;

/// Well-known section names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Tokens,
    Strings,
    Fields,
    FieldSets,
    Paths,
    Specs,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Tokens,
        SectionKind::Strings,
        SectionKind::Fields,
        SectionKind::FieldSets,
        SectionKind::Paths,
        SectionKind::Specs,
    ];

    /// Name as stored in the container.
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Tokens => "TOKENS",
            SectionKind::Strings => "STRINGS",
            SectionKind::Fields => "FIELDS",
            SectionKind::FieldSets => "FIELDSETS",
            SectionKind::Paths => "PATHS",
            SectionKind::Specs => "SPECS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named byte range within the container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub start: u64,
    pub size: u64,
}

impl Section {
    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    /// Well-known kind, if the name is one.
    pub fn kind(&self) -> Option<SectionKind> {
        SectionKind::from_name(&self.name)
    }
}

/// Ordered list of sections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub sections: Vec<Section>,
}

impl TableOfContents {
    /// First section of the given kind.
    pub fn find(&self, kind: SectionKind) -> Option<&Section> {
        self.find_by_name(kind.name())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

fn invalid(index: usize, reason: impl Into<String>) -> CrateError {
    CrateError::InvalidSection {
        index,
        reason: reason.into(),
    }
}

/// Read the table of contents at the offset recorded in the bootstrap.
pub fn read_toc<S: ByteSource>(
    reader: &ContainerReader<S>,
    bootstrap: &Bootstrap,
    config: &ReaderConfig,
) -> CrateResult<TableOfContents> {
    let mut cursor = reader.cursor_at(bootstrap.toc_offset);

    let count = cursor.read_u64_le()?;
    if count >= config.max_toc_sections {
        return Err(CrateError::TooManySections {
            count,
            limit: config.max_toc_sections,
        });
    }
    // Every record must fit before anything is allocated for it.
    reader.check_range(cursor.position(), count.saturating_mul(SECTION_RECORD_SIZE))?;
    log::debug!("TOC has {} sections", count);

    let file_len = reader.len();
    let mut sections = Vec::with_capacity(count as usize);
    for index in 0..count as usize {
        let raw_name = cursor.read_array::<{ SECTION_NAME_MAX_LEN + 1 }>()?;
        let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
        let name = std::str::from_utf8(&raw_name[..name_len])
            .map_err(|_| invalid(index, "section name is not valid UTF-8"))?
            .to_string();

        let start = cursor.read_i64_le()?;
        let size = cursor.read_i64_le()?;

        if start < 0 {
            return Err(invalid(index, format!("negative start offset {}", start)));
        }
        if size <= 0 {
            return Err(invalid(index, format!("invalid or empty size {}", size)));
        }
        let (start, size) = (start as u64, size as u64);
        match start.checked_add(size) {
            Some(end) if end <= file_len => {}
            _ => {
                return Err(invalid(
                    index,
                    format!("range {}+{} exceeds file size {}", start, size, file_len),
                ))
            }
        }

        log::debug!("section[{}] {} start={} size={}", index, name, start, size);
        sections.push(Section { name, start, size });
    }

    Ok(TableOfContents { sections })
}
