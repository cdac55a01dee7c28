//! The image placeholder module.
//!
//! Claims `{%name}` tags, resolves `name` to image bytes and replaces the tag
//! with an inline drawing of the embedded image.

use rp_package::Package;
use rp_template::{
    HostServices, ModuleError, ModuleOutput, PartScope, Placeholder, RenderContext, Splice,
    TemplateModule,
};

use crate::allocator::{IdAllocator, drawing_ids};
use crate::consts::{DEFAULT_HEIGHT_PX, DEFAULT_MARKER, DEFAULT_WIDTH_PX};
use crate::error::{ImageError, Resolution, SkipReason};
use crate::manifest::{ManifestManager, RegisterError};
use crate::markup::{DrawingSpec, inline_drawing};
use crate::resolver::{BoxError, ImageResolver, SizeFn, TransformFn};
use crate::size::ImageSize;

const MODULE_NAME: &str = "image";

/// Embeds images bound in the render context.
///
/// # Example
///
/// ```ignore
/// use rp_image::ImageModule;
/// use rp_template::{RenderContext, TemplateRenderer};
///
/// let module = ImageModule::builder().size_from_header().build();
/// let mut renderer = TemplateRenderer::new().with_module(module);
///
/// let ctx = RenderContext::new().with_value("chart", png_bytes);
/// renderer.render_package(&mut package, &ctx)?;
/// ```
#[derive(Debug)]
pub struct ImageModule {
    marker: char,
    resolver: ImageResolver,
    manager: Option<ManifestManager>,
}

impl ImageModule {
    /// Create a module builder.
    #[must_use]
    pub fn builder() -> ImageModuleBuilder {
        ImageModuleBuilder::default()
    }

    /// Placeholder marker character.
    #[must_use]
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Resolve, register and draw one image placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] only for failures that must abort the render
    /// pass. Every per-placeholder problem is a [`Resolution::Skipped`].
    pub fn render_image(
        &mut self,
        name: &str,
        ctx: &RenderContext,
        scope: &mut PartScope<'_>,
    ) -> Result<Resolution, ImageError> {
        let manager = self.manager.as_mut().ok_or(ImageError::NotConfigured)?;

        let image = match self.resolver.resolve(name, ctx) {
            Ok(image) => image,
            Err(reason) => return Ok(Resolution::Skipped(reason)),
        };

        let registered = match manager.register_image(&mut *scope.package, scope.part, &image) {
            Ok(registered) => registered,
            Err(RegisterError::ManifestCorrupt { path, source }) => {
                return Ok(Resolution::Skipped(SkipReason::ManifestCorrupt {
                    path,
                    source,
                }));
            }
            Err(RegisterError::Exhausted(_)) => {
                return Ok(Resolution::Skipped(SkipReason::Exhausted));
            }
            Err(RegisterError::Fatal(e)) => return Err(e),
        };

        let fragment = inline_drawing(&DrawingSpec {
            rel_id: &registered.relationship.id,
            drawing_id: registered.allocation.drawing_id(),
            extent: image.extent,
            name,
        });
        Ok(Resolution::Embedded(fragment))
    }
}

impl TemplateModule for ImageModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn recognize(&self, tag: &str) -> Option<Placeholder> {
        let name = tag.strip_prefix(self.marker)?.trim();
        if name.is_empty() || name.starts_with(self.marker) {
            return None;
        }
        Some(Placeholder {
            name: name.to_owned(),
            module: MODULE_NAME.to_owned(),
            raw: tag.to_owned(),
            splice: Splice::Run,
        })
    }

    fn configure(&mut self, services: &HostServices<'_>) -> Result<(), ModuleError> {
        let allocator = seed_allocator(services.package, services.content_parts);
        tracing::debug!(next_id = ?allocator.peek(), "Image module configured");
        self.manager = Some(ManifestManager::new(allocator));
        Ok(())
    }

    fn render(
        &mut self,
        placeholder: &Placeholder,
        ctx: &RenderContext,
        scope: &mut PartScope<'_>,
    ) -> Result<ModuleOutput, ModuleError> {
        match self.render_image(&placeholder.name, ctx, scope)? {
            Resolution::Embedded(fragment) => Ok(ModuleOutput::Xml(fragment)),
            Resolution::Skipped(reason) => {
                tracing::warn!(
                    placeholder = %placeholder.name,
                    part = scope.part,
                    category = reason.category(),
                    reason = %reason,
                    "Image placeholder left blank"
                );
                Ok(ModuleOutput::Empty)
            }
        }
    }
}

/// Seed a counter above every relationship id and drawing id in the package.
fn seed_allocator(package: &dyn Package, content_parts: &[String]) -> IdAllocator {
    let mut allocator = IdAllocator::new();

    for manifest in package.part_names().iter().filter(|p| p.ends_with(".rels")) {
        match package.relationships(manifest) {
            Ok(entries) => {
                for entry in &entries {
                    allocator.observe_id(&entry.id);
                }
            }
            Err(e) => tracing::warn!(manifest = %manifest, error = %e, "Skipping unreadable manifest"),
        }
    }

    for part in content_parts {
        match package.read_text(part) {
            Ok(xml) => {
                for id in drawing_ids(&xml) {
                    allocator.observe(id);
                }
            }
            Err(e) => tracing::warn!(part = %part, error = %e, "Skipping unreadable part"),
        }
    }

    allocator
}

/// Builder for [`ImageModule`].
pub struct ImageModuleBuilder {
    marker: char,
    transform: Option<TransformFn>,
    size_of: Option<SizeFn>,
    default_size: ImageSize,
    max_width: Option<f64>,
}

impl Default for ImageModuleBuilder {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            transform: None,
            size_of: None,
            default_size: ImageSize::new(DEFAULT_WIDTH_PX, DEFAULT_HEIGHT_PX),
            max_width: None,
        }
    }
}

impl ImageModuleBuilder {
    /// Set the placeholder marker (default `%`).
    #[must_use]
    pub fn marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Transform resolved bytes before embedding.
    #[must_use]
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, BoxError> + Send + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Compute the display size of each image.
    #[must_use]
    pub fn size_of<F>(mut self, size_of: F) -> Self
    where
        F: Fn(&[u8]) -> Option<ImageSize> + Send + 'static,
    {
        self.size_of = Some(Box::new(size_of));
        self
    }

    /// Size images by the pixel dimensions in their header.
    #[must_use]
    pub fn size_from_header(self) -> Self {
        self.size_of(ImageSize::from_header)
    }

    /// Size used when no sizing function is set (default 600x400 px).
    #[must_use]
    pub fn default_size(mut self, size: ImageSize) -> Self {
        self.default_size = size;
        self
    }

    /// Scale images wider than `max_width` pixels down proportionally.
    #[must_use]
    pub fn max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Build the module.
    #[must_use]
    pub fn build(self) -> ImageModule {
        ImageModule {
            marker: self.marker,
            resolver: ImageResolver::new(
                self.transform,
                self.size_of,
                self.default_size,
                self.max_width,
            ),
            manager: None,
        }
    }
}
