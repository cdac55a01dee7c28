//! Inline drawing markup.
//!
//! Generates the `<w:drawing>` fragment that places an embedded image inline
//! with the surrounding text run.

use rp_template::escape_xml;

use crate::size::Extent;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Inputs of an inline drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingSpec<'a> {
    /// Relationship id of the image part (`r:embed`).
    pub rel_id: &'a str,
    /// Drawing object id, unique within the document.
    pub drawing_id: u32,
    /// Display size.
    pub extent: Extent,
    /// Display name (e.g., the placeholder name).
    pub name: &'a str,
}

/// Build the inline drawing fragment for an embedded image.
///
/// The fragment declares every namespace prefix it uses, so it is well-formed
/// on its own and stays valid when spliced into a run of a document that
/// declares the same prefixes.
#[must_use]
pub fn inline_drawing(spec: &DrawingSpec<'_>) -> String {
    let cx = spec.extent.cx();
    let cy = spec.extent.cy();
    let id = spec.drawing_id;
    let name = escape_xml(spec.name);
    let rel_id = escape_xml(spec.rel_id);

    format!(
        concat!(
            r#"<w:drawing xmlns:w="{ns_w}" xmlns:wp="{ns_wp}" xmlns:a="{ns_a}" xmlns:pic="{ns_pic}" xmlns:r="{ns_r}">"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{id}" name="{name}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic><a:graphicData uri="{ns_pic}">"#,
            r#"<pic:pic>"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr><a:picLocks noChangeAspect="1" noChangeArrowheads="1"/></pic:cNvPicPr></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel_id}"/><a:srcRect/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr bwMode="auto"><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/><a:ln><a:noFill/></a:ln></pic:spPr>"#,
            r#"</pic:pic>"#,
            r#"</a:graphicData></a:graphic>"#,
            r#"</wp:inline>"#,
            r#"</w:drawing>"#,
        ),
        ns_w = NS_W,
        ns_wp = NS_WP,
        ns_a = NS_A,
        ns_pic = NS_PIC,
        ns_r = NS_R,
        cx = cx,
        cy = cy,
        id = id,
        name = name,
        rel_id = rel_id,
    )
}
