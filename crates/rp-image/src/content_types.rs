//! `[Content_Types].xml` maintenance.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use rp_package::{CONTENT_TYPES_PART, Package, PackageError};
use rp_template::escape_xml;

use crate::media::MediaType;
use crate::patch::{append_child, find_root_end};

/// Make sure the content type registry has a `<Default>` for the media's
/// extension.
///
/// Returns `true` if the registry was changed. A missing or unparsable
/// registry is left alone and logged; word processors then refuse the part,
/// but the rest of the document is unaffected.
///
/// # Errors
///
/// Returns [`PackageError`] if the updated registry can't be written.
pub fn ensure_default(package: &mut dyn Package, media: MediaType) -> Result<bool, PackageError> {
    let xml = match package.read_text(CONTENT_TYPES_PART) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::warn!(error = %e, "Content type registry unreadable, not updated");
            return Ok(false);
        }
    };

    let end = match has_default(&xml, media.extension) {
        Ok(true) => return Ok(false),
        Ok(false) => find_root_end(&xml),
        Err(e) => Err(e),
    };
    let end = match end {
        Ok(Some(end)) => end,
        Ok(None) => {
            tracing::warn!("Content type registry has no root element, not updated");
            return Ok(false);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Content type registry unparsable, not updated");
            return Ok(false);
        }
    };

    let element = format!(
        r#"<Default Extension="{}" ContentType="{}"/>"#,
        escape_xml(media.extension),
        escape_xml(media.content_type)
    );
    let (updated, _) = append_child(&xml, &end, &element);
    package.write_part(CONTENT_TYPES_PART, updated.into_bytes())?;
    tracing::debug!(extension = media.extension, "Registered content type");
    Ok(true)
}

/// Whether a `<Default>` entry exists for `extension` (case-insensitive).
fn has_default(xml: &str, extension: &str) -> Result<bool, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Default" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"Extension"
                        && attr.value.as_ref().eq_ignore_ascii_case(extension.as_bytes())
                    {
                        return Ok(true);
                    }
                }
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
    }
}
