//! Inline chart images for OOXML report templates.
//!
//! [`ImageModule`] is a [`TemplateModule`](rp_template::TemplateModule) that
//! replaces `{%name}` placeholders with images bound in the render context.
//!
//! # Render flow
//!
//! For every claimed placeholder:
//!
//! 1. [`ImageResolver`] looks the name up, applies the optional transform and
//!    sizing functions and converts the size to EMU.
//! 2. [`ManifestManager`] stores the bytes as a media part, appends one entry
//!    to the source part's relationship manifest and registers the content
//!    type.
//! 3. [`inline_drawing`] produces the `<w:drawing>` fragment the host splices
//!    into the run.
//!
//! Identifiers come from one [`IdAllocator`] per render pass, seeded above
//! every relationship and drawing id already in the package.
//!
//! # Failure handling
//!
//! Per-placeholder problems ([`SkipReason`]) are logged and render as blank
//! text. A package that rejects a write fails the whole pass through
//! [`ModuleError::Fatal`](rp_template::ModuleError::Fatal), since a document
//! referencing a missing part would be corrupt.

mod allocator;
mod consts;
mod content_types;
mod error;
mod manifest;
mod markup;
mod media;
mod module;
mod patch;
mod resolver;
mod size;

pub use allocator::{Allocation, Exhausted, IdAllocator, drawing_ids};
pub use consts::{
    DEFAULT_HEIGHT_PX, DEFAULT_MARKER, DEFAULT_WIDTH_PX, EMU_PER_PIXEL, IMAGE_REL_TYPE,
    MIN_EXTENT_EMU,
};
pub use content_types::ensure_default;
pub use error::{ImageError, ManifestSource, Resolution, SkipReason, UnresolvedReason};
pub use manifest::{ManifestManager, RegisterError, RegisteredImage, RelationshipManifest};
pub use markup::{DrawingSpec, inline_drawing};
pub use media::MediaType;
pub use module::{ImageModule, ImageModuleBuilder};
pub use resolver::{BoxError, ImageResolver, ResolvedImage, SizeFn, TransformFn};
pub use size::{Extent, ImageSize};
