//! Template rendering host for OOXML report packages.
//!
//! This crate provides the boundary between a report template and the
//! modules that fill it:
//!
//! - [`RenderContext`]: values bound to placeholder names for one render pass
//! - [`TemplateModule`]: trait for modules that claim marker-prefixed tags
//! - [`TemplateRenderer`]: renders the content parts of a [`Package`] in place
//!
//! # Architecture
//!
//! A render pass is strictly sequential:
//!
//! 1. **Configure**: every registered module receives [`HostServices`] once.
//! 2. **Render**: each content part (`word/document.xml`, then headers and
//!    footers) is split into literal and `{tag}` segments. Tags claimed by a
//!    module are rendered by it with an explicit [`PartScope`]; the rest are
//!    plain text substitutions.
//! 3. **Write back**: changed parts are written to the package.
//!
//! Loops, conditions and other template grammar are out of scope; only
//! `{name}` text tags and module-claimed tags are understood.
//!
//! [`Package`]: rp_package::Package

mod context;
mod module;
mod parser;
mod renderer;
mod util;

pub use context::{RenderContext, ResolveError, Value};
pub use module::{
    HostServices, ModuleError, ModuleOutput, PartScope, Placeholder, Splice, TemplateModule,
};
pub use parser::{Segment, parse_tags};
pub use renderer::{MAIN_DOCUMENT_PART, RenderError, RenderReport, TemplateRenderer};
pub use util::escape_xml;
