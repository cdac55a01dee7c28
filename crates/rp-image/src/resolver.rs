//! Placeholder value to embeddable image.

use std::fmt;

use rp_template::{RenderContext, Value};

use crate::error::{SkipReason, UnresolvedReason};
use crate::media::MediaType;
use crate::size::{Extent, ImageSize};

/// Boxed error returned by a transform function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Converts resolved bytes into the bytes to embed (e.g., re-encoding).
pub type TransformFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>, BoxError> + Send>;

/// Computes the display size of image bytes in pixels.
pub type SizeFn = Box<dyn Fn(&[u8]) -> Option<ImageSize> + Send>;

/// Image bytes ready to be registered, with their display size.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    /// Bytes to store in the media part.
    pub bytes: Vec<u8>,
    /// Display size in pixels.
    pub size: ImageSize,
    /// Display size in EMU.
    pub extent: Extent,
    /// Detected media type.
    pub media: MediaType,
}

/// Turns a placeholder's context value into a [`ResolvedImage`].
pub struct ImageResolver {
    transform: Option<TransformFn>,
    size_of: Option<SizeFn>,
    default_size: ImageSize,
    max_width: Option<f64>,
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("transform", &self.transform.is_some())
            .field("size_of", &self.size_of.is_some())
            .field("default_size", &self.default_size)
            .field("max_width", &self.max_width)
            .finish()
    }
}

impl ImageResolver {
    /// Create a resolver.
    ///
    /// Without `size_of`, every image gets `default_size`.
    #[must_use]
    pub fn new(
        transform: Option<TransformFn>,
        size_of: Option<SizeFn>,
        default_size: ImageSize,
        max_width: Option<f64>,
    ) -> Self {
        Self {
            transform,
            size_of,
            default_size,
            max_width,
        }
    }

    /// Resolve `name` against the context.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] that makes this placeholder render blank:
    /// no byte value, a failed transform or sizing, a size that rounds to
    /// nothing, or bytes that are not a displayable image format.
    pub fn resolve(&self, name: &str, ctx: &RenderContext) -> Result<ResolvedImage, SkipReason> {
        let value = match ctx.resolve(name) {
            Ok(Some(Value::Null) | None) => return Err(UnresolvedReason::Missing.into()),
            Ok(Some(value)) => value,
            Err(e) => return Err(UnresolvedReason::ResolveFailed(e).into()),
        };
        let raw = value
            .as_bytes()
            .ok_or_else(|| UnresolvedReason::NotBytes(value.kind()))?;
        if raw.is_empty() {
            return Err(UnresolvedReason::Empty.into());
        }

        let bytes = match &self.transform {
            Some(transform) => {
                let out = transform(raw)
                    .map_err(|e| UnresolvedReason::TransformFailed(e.to_string()))?;
                if out.is_empty() {
                    return Err(
                        UnresolvedReason::TransformFailed("transform produced no bytes".to_owned())
                            .into(),
                    );
                }
                out
            }
            None => raw.to_vec(),
        };

        let mut size = match &self.size_of {
            Some(size_of) => size_of(&bytes).ok_or(UnresolvedReason::UnknownSize)?,
            None => self.default_size,
        };
        if let Some(max_width) = self.max_width {
            size = size.fit_width(max_width);
        }

        let extent = Extent::from_size(size).ok_or(SkipReason::Degenerate {
            width: size.width,
            height: size.height,
        })?;
        let media = MediaType::sniff(&bytes).ok_or(UnresolvedReason::UnsupportedFormat)?;

        Ok(ResolvedImage {
            bytes,
            size,
            extent,
            media,
        })
    }
}
