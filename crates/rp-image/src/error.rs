//! Outcome and error types of the image module.
//!
//! Every placeholder ends in one of three ways:
//!
//! - **Embedded**: the image part was registered and a drawing fragment
//!   produced ([`Resolution::Embedded`]).
//! - **Skipped**: a recoverable problem with this one placeholder. The slot
//!   renders blank and the pass continues ([`Resolution::Skipped`]).
//! - **Fatal**: the package itself can't be completed ([`ImageError`]). The
//!   render pass fails.

use rp_package::{PackageError, RelsError};
use rp_template::{ModuleError, ResolveError};

/// Why a placeholder's value could not be turned into image bytes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UnresolvedReason {
    /// The name is not bound in the context (or bound to null).
    #[error("no value bound")]
    Missing,
    /// The context lookup itself failed.
    #[error("lookup failed: {0}")]
    ResolveFailed(#[source] ResolveError),
    /// The value is not a byte sequence.
    #[error("expected bytes, got {0}")]
    NotBytes(&'static str),
    /// The byte sequence is empty.
    #[error("image bytes are empty")]
    Empty,
    /// The configured transform failed or produced nothing.
    #[error("transform failed: {0}")]
    TransformFailed(String),
    /// The configured sizing function could not size the image.
    #[error("image size unknown")]
    UnknownSize,
    /// The bytes are not in a format a word processor displays inline.
    #[error("unsupported image format")]
    UnsupportedFormat,
}

/// A recoverable per-placeholder failure.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SkipReason {
    /// No usable image bytes.
    #[error("unresolved: {0}")]
    Unresolved(UnresolvedReason),

    /// The computed display size is zero, negative or not finite.
    #[error("degenerate size {width}x{height} px")]
    Degenerate {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },

    /// The part's relationship manifest is missing or unparsable.
    #[error("relationship manifest {path} is corrupt")]
    ManifestCorrupt {
        /// Manifest part name.
        path: String,
        /// Parse or read failure.
        #[source]
        source: ManifestSource,
    },

    /// No identifiers are left above the ones already in the package.
    #[error("identifier space exhausted")]
    Exhausted,
}

impl SkipReason {
    /// Short category name for logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unresolved(_) => "unresolved",
            Self::Degenerate { .. } => "degenerate",
            Self::ManifestCorrupt { .. } => "manifest_corrupt",
            Self::Exhausted => "exhausted",
        }
    }
}

impl From<UnresolvedReason> for SkipReason {
    fn from(reason: UnresolvedReason) -> Self {
        Self::Unresolved(reason)
    }
}

/// Underlying cause of a corrupt manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestSource {
    /// The manifest part could not be read.
    #[error(transparent)]
    Read(#[from] PackageError),

    /// The manifest is not UTF-8.
    #[error("manifest is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    /// The manifest is not a relationship document.
    #[error(transparent)]
    Parse(#[from] RelsError),
}

/// Failure that aborts the render pass.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// The package rejected a part the output depends on.
    #[error("failed to write image into package")]
    PackageWrite(#[from] PackageError),

    /// `render` was called before `configure`.
    #[error("image module used before configure")]
    NotConfigured,
}

impl From<ImageError> for ModuleError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::PackageWrite(e) => Self::Fatal(e),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Result of rendering one image placeholder that did not fail the pass.
#[derive(Debug)]
pub enum Resolution {
    /// Inline drawing fragment referencing the registered image.
    Embedded(String),
    /// The slot renders blank.
    Skipped(SkipReason),
}

impl Resolution {
    /// Fragment, if the image was embedded.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Embedded(xml) => Some(xml),
            Self::Skipped(_) => None,
        }
    }
}
