//! Media type detection for embedded images.

use image::ImageFormat;

/// File extension and content type of an embedded image part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
    /// Extension used for the part name and the content-type default.
    pub extension: &'static str,
    /// MIME content type registered in `[Content_Types].xml`.
    pub content_type: &'static str,
}

impl MediaType {
    /// PNG.
    pub const PNG: Self = Self {
        extension: "png",
        content_type: "image/png",
    };

    /// Detect the media type from the payload's magic bytes.
    ///
    /// Returns `None` for unrecognized payloads and for formats a word
    /// processor can't display inline (WebP, AVIF, ...).
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let media = match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Self::PNG,
            ImageFormat::Jpeg => Self {
                extension: "jpeg",
                content_type: "image/jpeg",
            },
            ImageFormat::Gif => Self {
                extension: "gif",
                content_type: "image/gif",
            },
            ImageFormat::Bmp => Self {
                extension: "bmp",
                content_type: "image/bmp",
            },
            ImageFormat::Tiff => Self {
                extension: "tiff",
                content_type: "image/tiff",
            },
            _ => return None,
        };
        Some(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_sniff_png() {
        assert_eq!(MediaType::sniff(&png_bytes(2, 2)), Some(MediaType::PNG));
    }

    #[test]
    fn test_sniff_jpeg() {
        let jpeg_magic = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(MediaType::sniff(&jpeg_magic).unwrap().extension, "jpeg");
    }

    #[test]
    fn test_sniff_gif() {
        assert_eq!(
            MediaType::sniff(b"GIF89a\x01\x00\x01\x00").unwrap().content_type,
            "image/gif"
        );
    }

    #[test]
    fn test_sniff_rejects_unknown_payloads() {
        assert_eq!(MediaType::sniff(b"<svg/>"), None);
        assert_eq!(MediaType::sniff(b"600x400"), None);
    }

    #[test]
    fn test_sniff_rejects_webp() {
        let webp = b"RIFF\x24\x00\x00\x00WEBPVP8 \x18\x00\x00\x00";
        assert_eq!(MediaType::sniff(webp), None);
    }
}
