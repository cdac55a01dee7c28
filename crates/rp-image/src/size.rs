//! Image dimensions and drawing extents.

use std::io::Cursor;

use crate::consts::{EMU_PER_PIXEL, MIN_EXTENT_EMU};

/// Display size of an image in pixels (96 DPI reference).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl ImageSize {
    /// Create a size from pixel dimensions.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Read the pixel dimensions from an encoded image's header.
    ///
    /// Supports PNG, JPEG, GIF and BMP. Returns `None` for anything else or
    /// for truncated headers.
    #[must_use]
    pub fn from_header(bytes: &[u8]) -> Option<Self> {
        let (width, height) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()?;
        Some(Self::new(f64::from(width), f64::from(height)))
    }

    /// Scale both dimensions down so the width doesn't exceed `max_width`.
    ///
    /// Sizes already within the limit are returned unchanged.
    #[must_use]
    pub fn fit_width(self, max_width: f64) -> Self {
        if self.width <= max_width || self.width <= 0.0 {
            return self;
        }
        let ratio = max_width / self.width;
        Self::new(max_width, self.height * ratio)
    }
}

/// Size of a drawing in English Metric Units.
///
/// Both dimensions are at least [`MIN_EXTENT_EMU`]; an `Extent` can't be
/// zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    cx: u64,
    cy: u64,
}

impl Extent {
    /// Create an extent from EMU values.
    ///
    /// Returns `None` if either dimension is below [`MIN_EXTENT_EMU`].
    #[must_use]
    pub fn new(cx: u64, cy: u64) -> Option<Self> {
        (cx >= MIN_EXTENT_EMU && cy >= MIN_EXTENT_EMU).then_some(Self { cx, cy })
    }

    /// Convert a pixel size to EMU.
    ///
    /// Returns `None` if a dimension is non-finite or rounds below
    /// [`MIN_EXTENT_EMU`].
    #[must_use]
    pub fn from_size(size: ImageSize) -> Option<Self> {
        Self::new(to_emu(size.width)?, to_emu(size.height)?)
    }

    /// Width in EMU.
    #[must_use]
    pub fn cx(self) -> u64 {
        self.cx
    }

    /// Height in EMU.
    #[must_use]
    pub fn cy(self) -> u64 {
        self.cy
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_emu(pixels: f64) -> Option<u64> {
    let emu = (pixels * EMU_PER_PIXEL).round();
    // u64::MAX as f64 rounds up, so compare against a value that fits.
    if !emu.is_finite() || emu < 0.0 || emu >= 1.8e19 {
        return None;
    }
    Some(emu as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_from_size_converts_pixels() {
        let extent = Extent::from_size(ImageSize::new(600.0, 400.0)).unwrap();
        assert_eq!(extent.cx(), 5_715_000);
        assert_eq!(extent.cy(), 3_810_000);
    }

    #[test]
    fn test_from_size_rejects_degenerate() {
        assert!(Extent::from_size(ImageSize::new(0.0, 400.0)).is_none());
        assert!(Extent::from_size(ImageSize::new(600.0, 0.0)).is_none());
        assert!(Extent::from_size(ImageSize::new(-5.0, 400.0)).is_none());
        assert!(Extent::from_size(ImageSize::new(0.000_01, 0.000_01)).is_none());
        assert!(Extent::from_size(ImageSize::new(f64::NAN, 1.0)).is_none());
        assert!(Extent::from_size(ImageSize::new(f64::INFINITY, 1.0)).is_none());
    }

    #[test]
    fn test_from_size_smallest_visible() {
        // 0.0001 px = 0.9525 EMU, rounds to 1
        let extent = Extent::from_size(ImageSize::new(0.0001, 1.0)).unwrap();
        assert_eq!(extent.cx(), 1);
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(Extent::new(0, 10).is_none());
        assert!(Extent::new(10, 0).is_none());
        assert!(Extent::new(1, 1).is_some());
    }

    #[test]
    fn test_fit_width() {
        let size = ImageSize::new(1200.0, 800.0).fit_width(600.0);
        assert_eq!(size, ImageSize::new(600.0, 400.0));

        let small = ImageSize::new(300.0, 200.0).fit_width(600.0);
        assert_eq!(small, ImageSize::new(300.0, 200.0));
    }

    #[test]
    fn test_from_header_png() {
        let size = ImageSize::from_header(&png_bytes(600, 400)).unwrap();
        assert_eq!(size, ImageSize::new(600.0, 400.0));
    }

    #[test]
    fn test_from_header_garbage() {
        assert!(ImageSize::from_header(b"definitely not an image").is_none());
        assert!(ImageSize::from_header(&[]).is_none());
        // Valid signature, truncated header
        assert!(ImageSize::from_header(&png_bytes(10, 10)[..12]).is_none());
    }
}
