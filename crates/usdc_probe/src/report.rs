//! Per-file probe results.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use usdc_core::{validate, CrateFile, FileSource, ReaderConfig, Section, ValidationResult, Version};

/// Overall verdict for one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Valid,
    Invalid,
    Error,
}

/// What the probe learned about one file.
#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc_offset: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl FileReport {
    fn new(path: &Path, status: Status) -> Self {
        Self {
            path: path.display().to_string(),
            status,
            reason: None,
            version: None,
            toc_offset: None,
            sections: Vec::new(),
        }
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Status::Valid => {
                write!(f, "{}: valid", self.path)?;
                if let (Some(version), Some(toc_offset)) = (self.version, self.toc_offset) {
                    write!(f, " (version {}, TOC at {})", version, toc_offset)?;
                }
                for section in &self.sections {
                    write!(
                        f,
                        "\n  {:<16} start {:>10}  size {:>10}",
                        section.name, section.start, section.size
                    )?;
                }
                Ok(())
            }
            Status::Invalid => write!(
                f,
                "{}: invalid: {}",
                self.path,
                self.reason.as_deref().unwrap_or("unknown")
            ),
            Status::Error => write!(
                f,
                "{}: error: {}",
                self.path,
                self.reason.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Validate one file and, if it is a crate file, read its section table.
pub fn probe_file(path: &Path, config: &ReaderConfig) -> FileReport {
    match inspect(path, config) {
        Ok(report) => report,
        Err(e) => {
            log::warn!("{}: {:#}", path.display(), e);
            let mut report = FileReport::new(path, Status::Error);
            report.reason = Some(format!("{:#}", e));
            report
        }
    }
}

fn inspect(path: &Path, config: &ReaderConfig) -> Result<FileReport> {
    let source = FileSource::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    if let ValidationResult::Invalid(reason) =
        validate(&source).context("failed to read magic header")?
    {
        let mut report = FileReport::new(path, Status::Invalid);
        report.reason = Some(reason);
        return Ok(report);
    }

    let file = CrateFile::open(source, config.clone()).context("failed to read container")?;
    let mut report = FileReport::new(path, Status::Valid);
    report.version = Some(file.version());
    report.toc_offset = Some(file.bootstrap().toc_offset);
    report.sections = file.toc().sections.clone();
    Ok(report)
}
