//! Internal constants for image embedding.

/// English Metric Units per pixel at the 96 DPI reference resolution.
pub const EMU_PER_PIXEL: f64 = 9525.0;

/// Smallest extent (in EMU) an embedded image may have.
pub const MIN_EXTENT_EMU: u64 = 1;

/// Default placeholder marker: `{%chart}`.
pub const DEFAULT_MARKER: char = '%';

/// Size used when no sizing function is configured (pixels).
pub const DEFAULT_WIDTH_PX: f64 = 600.0;

/// Size used when no sizing function is configured (pixels).
pub const DEFAULT_HEIGHT_PX: f64 = 400.0;

/// Relationship type of embedded images.
pub const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Directory, relative to the source part, that receives media parts.
pub const MEDIA_DIR: &str = "media";
