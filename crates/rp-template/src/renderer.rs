//! Template renderer: drives one render pass over a package.

use rp_package::{Package, PackageError};

use crate::context::RenderContext;
use crate::module::{
    HostServices, ModuleError, ModuleOutput, PartScope, Placeholder, Splice, TemplateModule,
};
use crate::parser::{Segment, parse_tags};
use crate::util::escape_xml;

/// Main document part of a word-processing package.
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Reopens a text element after a run-level fragment.
const TEXT_REOPEN: &str = r#"<w:t xml:space="preserve">"#;

/// Error that fails the whole render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Package read or write failure.
    #[error("package error: {0}")]
    Package(#[from] PackageError),

    /// A content part is not UTF-8 XML.
    #[error("part {part} is not valid UTF-8")]
    Utf8 {
        /// Part name.
        part: String,
    },

    /// A module failed in a way that must abort the pass.
    #[error("module {module} failed: {source}")]
    Module {
        /// Module name.
        module: String,
        /// Underlying error.
        #[source]
        source: ModuleError,
    },
}

/// Summary of a completed render pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// Parts rendered, in order.
    pub parts: Vec<String>,
    /// Total tags encountered.
    pub tags: usize,
    /// Tags claimed by a module.
    pub module_tags: usize,
    /// Module tags that rendered a non-empty fragment.
    pub module_fragments: usize,
    /// Recoverable problems with plain text tags.
    pub warnings: Vec<String>,
}

/// Renders the content parts of a package against a context.
///
/// # Example
///
/// ```ignore
/// use rp_template::{RenderContext, TemplateRenderer};
///
/// let mut renderer = TemplateRenderer::new().with_module(ImageModule::builder().build());
/// let report = renderer.render_package(&mut package, &ctx)?;
/// ```
#[derive(Default)]
pub struct TemplateRenderer {
    modules: Vec<Box<dyn TemplateModule>>,
}

impl TemplateRenderer {
    /// Create a renderer with no modules (plain text substitution only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Earlier modules get the first chance to claim a tag.
    #[must_use]
    pub fn with_module<M: TemplateModule + 'static>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Render every content part of the package in place.
    ///
    /// Parts are rendered strictly in order; each changed part is written back
    /// before the next one is read.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a part can't be read or written, or a module
    /// reports a fatal error. The package may then hold partially rendered
    /// parts and must be discarded.
    pub fn render_package(
        &mut self,
        package: &mut dyn Package,
        ctx: &RenderContext,
    ) -> Result<RenderReport, RenderError> {
        let parts = content_parts(&*package);
        if parts.is_empty() {
            return Err(PackageError::not_found(MAIN_DOCUMENT_PART).into());
        }

        let services = HostServices {
            package: &*package,
            content_parts: &parts,
        };
        for module in &mut self.modules {
            module
                .configure(&services)
                .map_err(|source| RenderError::Module {
                    module: module.name().to_owned(),
                    source,
                })?;
        }

        let mut report = RenderReport::default();
        for part in &parts {
            let data = package.read_part(part)?;
            let xml = String::from_utf8(data).map_err(|_| RenderError::Utf8 { part: part.clone() })?;
            let rendered = self.render_part(part, &xml, ctx, package, &mut report)?;
            if rendered != xml {
                package.write_part(part, rendered.into_bytes())?;
            }
            report.parts.push(part.clone());
        }

        tracing::info!(
            parts = report.parts.len(),
            tags = report.tags,
            module_tags = report.module_tags,
            fragments = report.module_fragments,
            "Render pass completed"
        );
        Ok(report)
    }

    /// Render a single part's XML.
    ///
    /// Modules must have been configured for the current pass.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Module`] if a module fails fatally.
    pub fn render_part(
        &mut self,
        part: &str,
        xml: &str,
        ctx: &RenderContext,
        package: &mut dyn Package,
        report: &mut RenderReport,
    ) -> Result<String, RenderError> {
        let mut output = String::with_capacity(xml.len());

        for segment in parse_tags(xml) {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Tag { text, .. } => {
                    report.tags += 1;
                    match self.claim(text) {
                        Some((idx, placeholder)) => {
                            report.module_tags += 1;
                            let mut scope = PartScope {
                                part,
                                package: &mut *package,
                            };
                            let module = &mut self.modules[idx];
                            let rendered = module
                                .render(&placeholder, ctx, &mut scope)
                                .map_err(|source| RenderError::Module {
                                    module: module.name().to_owned(),
                                    source,
                                })?;
                            if let ModuleOutput::Xml(fragment) = rendered {
                                report.module_fragments += 1;
                                splice(&mut output, &fragment, placeholder.splice);
                            }
                        }
                        None => output.push_str(&substitute_text(text, ctx, report)),
                    }
                }
            }
        }

        Ok(output)
    }

    fn claim(&self, tag: &str) -> Option<(usize, Placeholder)> {
        self.modules
            .iter()
            .enumerate()
            .find_map(|(idx, m)| m.recognize(tag).map(|p| (idx, p)))
    }
}

/// Parts that carry template text, main document first.
fn content_parts(package: &dyn Package) -> Vec<String> {
    let mut parts: Vec<String> = package
        .part_names()
        .into_iter()
        .filter(|name| is_header_or_footer(name))
        .collect();
    parts.sort();
    if package.contains(MAIN_DOCUMENT_PART) {
        parts.insert(0, MAIN_DOCUMENT_PART.to_owned());
    }
    parts
}

fn is_header_or_footer(name: &str) -> bool {
    name.strip_prefix("word/").is_some_and(|file| {
        !file.contains('/')
            && file.ends_with(".xml")
            && (file.starts_with("header") || file.starts_with("footer"))
    })
}

/// Plain `{name}` substitution for tags no module claimed.
fn substitute_text(tag: &str, ctx: &RenderContext, report: &mut RenderReport) -> String {
    match ctx.resolve(tag) {
        Ok(Some(value)) => value.to_text().map_or_else(
            || {
                report
                    .warnings
                    .push(format!("{{{tag}}}: {} value has no text form", value.kind()));
                String::new()
            },
            |text| escape_xml(&text),
        ),
        Ok(None) => String::new(),
        Err(e) => {
            tracing::warn!(tag, error = %e, "Failed to resolve tag");
            report.warnings.push(format!("{{{tag}}}: {e}"));
            String::new()
        }
    }
}

fn splice(output: &mut String, fragment: &str, mode: Splice) {
    match mode {
        Splice::Run if inside_text_element(output) => {
            output.push_str("</w:t>");
            output.push_str(fragment);
            output.push_str(TEXT_REOPEN);
        }
        Splice::Run | Splice::Text => output.push_str(fragment),
    }
}

/// Whether the rendered prefix ends inside an open `<w:t>` element.
fn inside_text_element(prefix: &str) -> bool {
    let open = prefix
        .rfind("<w:t>")
        .into_iter()
        .chain(prefix.rfind("<w:t "))
        .max();
    let close = prefix.rfind("</w:t>");
    match (open, close) {
        (Some(o), Some(c)) => o > c,
        (Some(_), None) => true,
        _ => false,
    }
}
