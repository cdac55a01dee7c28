//! ZIP-backed package implementation.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::package::{Package, PackageError, PackageErrorKind};

/// Content type registry every OOXML package carries at its root.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const BACKEND: &str = "Zip";

/// OOXML package held fully in memory.
///
/// Parts keep their original container order; parts added during rendering
/// are appended after the existing ones when the package is written back.
#[derive(Debug, Default)]
pub struct ZipPackage {
    parts: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
}

impl ZipPackage {
    /// Load a package from ZIP bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PackageErrorKind::InvalidPackage`] if the bytes are not a ZIP
    /// archive or the archive has no `[Content_Types].xml`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PackageError> {
        let mut archive = ZipArchive::new(Cursor::new(data)).map_err(invalid)?;
        let mut package = Self::default();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(invalid)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_owned();
            let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut content)
                .map_err(|e| PackageError::io(e, Some(name.clone())).with_backend(BACKEND))?;
            package.insert(name, content);
        }

        if !package.contains(CONTENT_TYPES_PART) {
            return Err(PackageError::new(PackageErrorKind::InvalidPackage)
                .with_path(CONTENT_TYPES_PART)
                .with_backend(BACKEND));
        }

        tracing::debug!(parts = package.parts.len(), "Loaded package");
        Ok(package)
    }

    /// Load a package from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't a valid package.
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let data = std::fs::read(path)
            .map_err(|e| PackageError::io(e, Some(path.display().to_string())))?;
        Self::from_bytes(&data)
    }

    /// Serialize the package back to ZIP bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive can't be written.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PackageError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in &self.parts {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| write_error(e, name))?;
            writer
                .write_all(content)
                .map_err(|e| PackageError::io(e, Some(name.clone())).with_backend(BACKEND))?;
        }

        let cursor = writer.finish().map_err(|e| {
            PackageError::new(PackageErrorKind::Io)
                .with_backend(BACKEND)
                .with_source(e)
        })?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, path: &Path) -> Result<(), PackageError> {
        let data = self.to_bytes()?;
        std::fs::write(path, data).map_err(|e| PackageError::io(e, Some(path.display().to_string())))
    }

    fn insert(&mut self, name: String, content: Vec<u8>) {
        if let Some(&idx) = self.index.get(&name) {
            self.parts[idx].1 = content;
        } else {
            self.index.insert(name.clone(), self.parts.len());
            self.parts.push((name, content));
        }
    }
}

impl Package for ZipPackage {
    fn read_part(&self, path: &str) -> Result<Vec<u8>, PackageError> {
        self.index
            .get(path)
            .map(|&idx| self.parts[idx].1.clone())
            .ok_or_else(|| PackageError::not_found(path).with_backend(BACKEND))
    }

    fn write_part(&mut self, path: &str, data: Vec<u8>) -> Result<(), PackageError> {
        if path.is_empty() || path.starts_with('/') || path.ends_with('/') {
            return Err(PackageError::new(PackageErrorKind::WriteRejected)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.insert(path.to_owned(), data);
        Ok(())
    }

    fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    fn part_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parts.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }
}

fn invalid(err: zip::result::ZipError) -> PackageError {
    PackageError::new(PackageErrorKind::InvalidPackage)
        .with_backend(BACKEND)
        .with_source(err)
}

fn write_error(err: zip::result::ZipError, name: &str) -> PackageError {
    PackageError::new(PackageErrorKind::WriteRejected)
        .with_path(name)
        .with_backend(BACKEND)
        .with_source(err)
}
