//! OOXML package access for report rendering.
//!
//! This crate provides a [`Package`] trait for reading and writing the named
//! parts of an OOXML container (`.docx`). This enables:
//!
//! - **Unit testing** of part-mutating code without building ZIP archives
//! - **Explicit ownership**: each render pass borrows exactly one package
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Package`] trait with `read_part()`, `write_part()`, `contains()` and
//!   `relationships()` methods
//! - [`ZipPackage`] holding a loaded ZIP container in memory
//! - [`MemoryPackage`] for testing (behind `mock` feature flag)
//! - Relationship manifest parsing ([`parse_relationships`]) and part-name
//!   helpers ([`rels_path_for`], [`resolve_target`])
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rp_package::{Package, ZipPackage, rels_path_for};
//!
//! let package = ZipPackage::open(Path::new("template.docx"))?;
//! for rel in package.relationships(&rels_path_for("word/document.xml"))? {
//!     println!("{} -> {}", rel.id, rel.target);
//! }
//! ```

mod archive;
#[cfg(feature = "mock")]
mod memory;
mod package;
mod rels;

pub use archive::{CONTENT_TYPES_PART, ZipPackage};
#[cfg(feature = "mock")]
pub use memory::MemoryPackage;
pub use package::{Package, PackageError, PackageErrorKind};
pub use rels::{
    RELATIONSHIPS_NS, Relationship, RelsError, parse_relationships, part_dir, rels_path_for,
    resolve_target,
};
