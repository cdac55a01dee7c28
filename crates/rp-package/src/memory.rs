//! In-memory package implementation for testing.
//!
//! Provides [`MemoryPackage`] for unit testing without building ZIP archives.

use std::collections::BTreeMap;

use crate::package::{Package, PackageError, PackageErrorKind};

const BACKEND: &str = "Memory";

/// In-memory package for testing.
///
/// Stores parts in a sorted map. Use the builder methods to configure the
/// package with test data.
///
/// # Example
///
/// ```ignore
/// use rp_package::{MemoryPackage, Package};
///
/// let package = MemoryPackage::new()
///     .with_part("word/document.xml", "<w:document/>")
///     .with_part("word/_rels/document.xml.rels", "<Relationships/>");
///
/// let xml = package.read_text("word/document.xml")?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryPackage {
    parts: BTreeMap<String, Vec<u8>>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryPackage {
    /// Create a new empty package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part with the given name and content.
    #[must_use]
    pub fn with_part(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.parts.insert(path.into(), content.into());
        self
    }

    /// Make every subsequent [`Package::write_part`] call fail.
    #[must_use]
    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of successful writes since construction.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Package for MemoryPackage {
    fn read_part(&self, path: &str) -> Result<Vec<u8>, PackageError> {
        self.parts
            .get(path)
            .cloned()
            .ok_or_else(|| PackageError::not_found(path).with_backend(BACKEND))
    }

    fn write_part(&mut self, path: &str, data: Vec<u8>) -> Result<(), PackageError> {
        if self.fail_writes {
            return Err(PackageError::new(PackageErrorKind::WriteRejected)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.parts.insert(path.to_owned(), data);
        self.writes += 1;
        Ok(())
    }

    fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    fn part_names(&self) -> Vec<String> {
        self.parts.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut package = MemoryPackage::new().with_part("a.xml", "<a/>");

        assert_eq!(package.read_text("a.xml").unwrap(), "<a/>");
        package.write_part("b.xml", b"<b/>".to_vec()).unwrap();
        assert!(package.contains("b.xml"));
        assert_eq!(package.write_count(), 1);
        assert_eq!(package.part_names(), vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_fail_writes() {
        let mut package = MemoryPackage::new().fail_writes();
        let err = package.write_part("a.xml", Vec::new()).unwrap_err();
        assert_eq!(err.kind, PackageErrorKind::WriteRejected);
        assert!(!package.contains("a.xml"));
    }
}
