//! Package trait and error types.
//!
//! Provides the core [`Package`] trait for reading and writing parts of an
//! OOXML container, along with [`PackageError`] for unified error handling
//! across backends.
//!
//! # Part Path Convention
//!
//! All path parameters are **part names** without a leading slash, exactly as
//! they appear in the ZIP central directory:
//! - `"[Content_Types].xml"` - content type registry
//! - `"word/document.xml"` - main document part
//! - `"word/_rels/document.xml.rels"` - relationship manifest of the main part
//! - `"word/media/image1.png"` - binary media part

use crate::rels::{Relationship, parse_relationships};

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PackageErrorKind {
    /// Part does not exist.
    NotFound,
    /// The container itself is not a usable OOXML package.
    InvalidPackage,
    /// The package refused a new or replaced part.
    WriteRejected,
    /// A part exists but its content could not be parsed.
    Malformed,
    /// Underlying I/O failure.
    Io,
    /// Other/unknown error category.
    Other,
}

/// Package error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct PackageError {
    /// Semantic error category.
    pub kind: PackageErrorKind,
    /// Part name context (if applicable).
    pub path: Option<String>,
    /// Backend identifier (e.g., "Zip", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PackageError {
    /// Create a new package error.
    #[must_use]
    pub fn new(kind: PackageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach part name context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with part name.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(PackageErrorKind::NotFound).with_path(path)
    }

    /// Create a malformed-content error with part name.
    #[must_use]
    pub fn malformed(path: impl Into<String>) -> Self {
        Self::new(PackageErrorKind::Malformed).with_path(path)
    }

    /// Create a package error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => PackageErrorKind::NotFound,
            _ => PackageErrorKind::Io,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Returns `true` if the error means the part does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == PackageErrorKind::NotFound
    }
}

impl std::fmt::Display for PackageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: word/document.xml)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            PackageErrorKind::NotFound => "Part not found",
            PackageErrorKind::InvalidPackage => "Invalid package",
            PackageErrorKind::WriteRejected => "Write rejected",
            PackageErrorKind::Malformed => "Malformed part",
            PackageErrorKind::Io => "I/O error",
            PackageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Access to the parts of one loaded OOXML package.
///
/// A package instance belongs to a single render pass. Concurrent reports
/// must each load their own instance; implementations are `Send` so a
/// package can be moved to a worker thread, but nothing here is designed to
/// be shared between passes.
pub trait Package: Send {
    /// Read the raw bytes of a part.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError`] with [`PackageErrorKind::NotFound`] if the part
    /// doesn't exist.
    fn read_part(&self, path: &str) -> Result<Vec<u8>, PackageError>;

    /// Create or replace a part.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError`] if the package cannot accept the part. Callers
    /// must treat this as fatal for the document being generated.
    fn write_part(&mut self, path: &str, data: Vec<u8>) -> Result<(), PackageError>;

    /// Check if a part exists.
    fn contains(&self, path: &str) -> bool;

    /// Names of all parts, sorted.
    fn part_names(&self) -> Vec<String>;

    /// List the entries of a relationship manifest part.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError`] if the manifest doesn't exist or isn't a
    /// parsable relationship document.
    fn relationships(&self, manifest_path: &str) -> Result<Vec<Relationship>, PackageError> {
        let data = self.read_part(manifest_path)?;
        let xml = std::str::from_utf8(&data)
            .map_err(|e| PackageError::malformed(manifest_path).with_source(e))?;
        parse_relationships(xml).map_err(|e| PackageError::malformed(manifest_path).with_source(e))
    }

    /// Read a part and decode it as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError`] if the part doesn't exist or isn't valid UTF-8.
    fn read_text(&self, path: &str) -> Result<String, PackageError> {
        let data = self.read_part(path)?;
        String::from_utf8(data).map_err(|e| PackageError::malformed(path).with_source(e))
    }
}
