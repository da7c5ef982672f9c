//! USDC Core - Reader for the binary USD crate container.
//!
//! This crate provides:
//!
//! - **Header validation**: the `PXR-USDC` magic check over any [`ByteSource`]
//! - **Bounded reads**: [`ContainerReader`] with little-endian accessors
//! - **Container structure**: bootstrap header, table of contents and the
//!   TOKENS / STRINGS sections
//!
//! # Example
//!
//! ```ignore
//! use usdc_core::{validate, FileSource, ValidationResult};
//!
//! let source = FileSource::open("scene.usdc")?;
//! match validate(&source)? {
//!     ValidationResult::Valid => println!("crate file"),
//!     ValidationResult::Invalid(reason) => println!("rejected: {}", reason),
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod header;
pub mod reader;
pub mod source;
pub mod tokens;
pub mod toc;

mod file;

// Re-export commonly used types
pub use bootstrap::{read_bootstrap, Bootstrap, Version, BOOTSTRAP_SIZE};
pub use config::ReaderConfig;
pub use error::{CrateError, CrateResult};
pub use file::CrateFile;
pub use header::{is_usdc, validate, validate_reader, ValidationResult, BAD_MAGIC_REASON, MAGIC};
pub use reader::{ContainerReader, Cursor};
pub use source::{ByteSource, FileSource};
pub use tokens::{BlockFrame, Decompressor, TokensHeader};
pub use toc::{read_toc, Section, SectionKind, TableOfContents};
