//! High-level access to a crate container.

use crate::bootstrap::{read_bootstrap, Bootstrap, Version};
use crate::config::ReaderConfig;
use crate::error::CrateResult;
use crate::reader::ContainerReader;
use crate::source::ByteSource;
use crate::tokens::{read_string_indices, read_tokens, read_tokens_header, resolve_strings, Decompressor};
use crate::toc::{read_toc, TableOfContents};

/// A crate container whose bootstrap header and section table have been read.
///
/// # Example
///
/// ```ignore
/// use usdc_core::{CrateFile, FileSource, ReaderConfig};
///
/// let file = CrateFile::open(FileSource::open("scene.usdc")?, ReaderConfig::default())?;
/// println!("version {} with {} sections", file.version(), file.toc().len());
/// ```
#[derive(Debug)]
pub struct CrateFile<S> {
    reader: ContainerReader<S>,
    bootstrap: Bootstrap,
    toc: TableOfContents,
    config: ReaderConfig,
}

impl<S: ByteSource> CrateFile<S> {
    /// Read the bootstrap header and the table of contents.
    pub fn open(source: S, config: ReaderConfig) -> CrateResult<Self> {
        let reader = ContainerReader::new(source);
        let bootstrap = read_bootstrap(&reader)?;
        let toc = read_toc(&reader, &bootstrap, &config)?;
        log::info!(
            "Opened crate {} ({} bytes, {} sections)",
            bootstrap.version,
            reader.len(),
            toc.len()
        );

        Ok(Self {
            reader,
            bootstrap,
            toc,
            config,
        })
    }

    pub fn version(&self) -> Version {
        self.bootstrap.version
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn toc(&self) -> &TableOfContents {
        &self.toc
    }

    pub fn reader(&self) -> &ContainerReader<S> {
        &self.reader
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Decode the TOKENS section.
    pub fn tokens<D: Decompressor + ?Sized>(&self, decompressor: &D) -> CrateResult<Vec<String>> {
        let header = read_tokens_header(&self.reader, &self.toc, self.version(), &self.config)?;
        read_tokens(&self.reader, &header, decompressor)
    }

    /// Resolve the STRINGS section against already decoded tokens.
    pub fn strings(&self, tokens: &[String]) -> CrateResult<Vec<String>> {
        let indices = read_string_indices(&self.reader, &self.toc, &self.config)?;
        resolve_strings(&indices, tokens)
    }
}
