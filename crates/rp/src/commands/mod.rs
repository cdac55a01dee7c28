//! CLI command implementations.

pub(crate) mod rels;
pub(crate) mod render;

pub(crate) use rels::RelsArgs;
pub(crate) use render::RenderArgs;
