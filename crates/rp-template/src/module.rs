//! Template module trait.
//!
//! Modules extend the renderer with placeholder kinds beyond plain text
//! substitution. A module claims tags by their leading marker character.

use rp_package::{Package, PackageError};

use crate::context::RenderContext;

/// How the host splices a module's markup into the part being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splice {
    /// Insert into the surrounding text (content is character data).
    Text,
    /// Insert as a sibling of the enclosing `<w:t>` element, inside the run.
    ///
    /// The host closes the text element before the fragment and reopens it
    /// afterwards, so drawing markup never ends up inside character data.
    Run,
}

/// A template tag claimed by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Context key to resolve (marker stripped).
    pub name: String,
    /// Name of the module that claimed the tag.
    pub module: String,
    /// Tag text as written between the delimiters.
    pub raw: String,
    /// Splice position for the rendered fragment.
    pub splice: Splice,
}

/// Output of rendering one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutput {
    /// XML fragment to splice into the part.
    Xml(String),
    /// Nothing: the slot renders as blank text.
    Empty,
}

impl ModuleOutput {
    /// Create an XML output.
    #[must_use]
    pub fn xml(s: impl Into<String>) -> Self {
        Self::Xml(s.into())
    }

    /// Returns `true` for [`ModuleOutput::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Error that aborts the whole render pass.
///
/// Recoverable per-placeholder problems never surface as a `ModuleError`;
/// modules degrade them to [`ModuleOutput::Empty`].
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The package could not accept a part the output depends on.
    #[error("package write failed: {0}")]
    Fatal(#[from] PackageError),

    /// Any other unrecoverable module failure.
    #[error("{0}")]
    Other(String),
}

/// Services the host hands to modules at the start of a render pass.
pub struct HostServices<'a> {
    /// Read-only view of the package before any placeholder is rendered.
    pub package: &'a dyn Package,
    /// Parts that will be rendered, in render order.
    pub content_parts: &'a [String],
}

/// The part currently being rendered, with mutable access to its package.
///
/// Modules receive the package per call and must not keep it.
pub struct PartScope<'a> {
    /// Name of the part being rendered (e.g., `word/document.xml`).
    pub part: &'a str,
    /// Package the part belongs to.
    pub package: &'a mut dyn Package,
}

/// Handler for a module-specific placeholder kind.
///
/// # Lifecycle
///
/// For each render pass the host calls [`configure`](Self::configure) once,
/// then [`recognize`](Self::recognize) for every tag and
/// [`render`](Self::render) for every tag the module claimed, sequentially
/// in document order.
///
/// # Thread Safety
///
/// Modules implement `Send` only (not `Sync`) since each render pass gets its
/// own renderer instance. For parallel report generation, create separate
/// renderer and module instances per thread.
///
/// # Example
///
/// ```
/// use rp_template::{
///     HostServices, ModuleError, ModuleOutput, PartScope, Placeholder, RenderContext, Splice,
///     TemplateModule,
/// };
///
/// struct Upper;
///
/// impl TemplateModule for Upper {
///     fn name(&self) -> &str { "upper" }
///
///     fn recognize(&self, tag: &str) -> Option<Placeholder> {
///         let name = tag.strip_prefix('^')?;
///         Some(Placeholder {
///             name: name.to_owned(),
///             module: self.name().to_owned(),
///             raw: tag.to_owned(),
///             splice: Splice::Text,
///         })
///     }
///
///     fn configure(&mut self, _services: &HostServices<'_>) -> Result<(), ModuleError> {
///         Ok(())
///     }
///
///     fn render(
///         &mut self,
///         placeholder: &Placeholder,
///         ctx: &RenderContext,
///         _scope: &mut PartScope<'_>,
///     ) -> Result<ModuleOutput, ModuleError> {
///         let text = ctx.resolve(&placeholder.name).ok().flatten().and_then(|v| v.to_text());
///         Ok(text.map_or(ModuleOutput::Empty, |t| ModuleOutput::xml(t.to_uppercase())))
///     }
/// }
/// ```
pub trait TemplateModule: Send {
    /// Module name, used in logs and [`Placeholder::module`].
    fn name(&self) -> &str;

    /// Claim a tag.
    ///
    /// Returns `None` for tags that don't carry this module's marker so other
    /// modules and the default text substitution can handle them.
    fn recognize(&self, tag: &str) -> Option<Placeholder>;

    /// Prepare per-pass state.
    ///
    /// Called once before the first `render` of every pass. Calling it again
    /// replaces all per-pass state.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError`] if the module can't render into this package.
    fn configure(&mut self, services: &HostServices<'_>) -> Result<(), ModuleError>;

    /// Render a claimed placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError`] only for failures that must abort the pass.
    fn render(
        &mut self,
        placeholder: &Placeholder,
        ctx: &RenderContext,
        scope: &mut PartScope<'_>,
    ) -> Result<ModuleOutput, ModuleError>;
}
