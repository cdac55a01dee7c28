//! Relationship manifest maintenance.
//!
//! [`RelationshipManifest`] edits a `.rels` part by appending entries without
//! touching existing markup. [`ManifestManager`] combines it with the
//! identifier counter to register image parts in a package.

use rp_package::{
    Package, Relationship, RelsError, parse_relationships, rels_path_for, resolve_target,
};
use rp_template::escape_xml;

use crate::allocator::{Allocation, Exhausted, IdAllocator};
use crate::consts::{IMAGE_REL_TYPE, MEDIA_DIR};
use crate::content_types;
use crate::error::{ImageError, ManifestSource};
use crate::patch::{RootEnd, append_child, find_root_end};
use crate::resolver::ResolvedImage;

/// A parsed relationship manifest that remembers its original text.
#[derive(Debug, Clone)]
pub struct RelationshipManifest {
    xml: String,
    entries: Vec<Relationship>,
    end: RootEnd,
}

impl RelationshipManifest {
    /// Parse a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`RelsError`] if the text is not a well-formed relationship
    /// document.
    pub fn parse(xml: impl Into<String>) -> Result<Self, RelsError> {
        let xml = xml.into();
        let entries = parse_relationships(&xml)?;
        let end = find_root_end(&xml)?.ok_or(RelsError::MissingRoot)?;
        Ok(Self { xml, entries, end })
    }

    /// Entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[Relationship] {
        &self.entries
    }

    /// Returns `true` if an entry with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    /// Append an entry as the last child of the root.
    ///
    /// Returns `false` and leaves the manifest unchanged if the id is already
    /// present.
    pub fn append(&mut self, entry: Relationship) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        let (xml, end) = append_child(&self.xml, &self.end, &relationship_element(&entry));
        self.xml = xml;
        self.end = end;
        self.entries.push(entry);
        true
    }

    /// Current manifest text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Consume the manifest, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.xml
    }
}

fn relationship_element(entry: &Relationship) -> String {
    let mut element = format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}""#,
        escape_xml(&entry.id),
        escape_xml(&entry.rel_type),
        escape_xml(&entry.target)
    );
    if let Some(mode) = &entry.target_mode {
        element.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
    }
    element.push_str("/>");
    element
}

/// An image part registered in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredImage {
    /// Identifiers reserved for the image.
    pub allocation: Allocation,
    /// The manifest entry that was appended.
    pub relationship: Relationship,
    /// Part name of the stored image.
    pub media_part: String,
}

/// Registration failure.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The source part's manifest is missing or unparsable. Nothing was
    /// written.
    #[error("relationship manifest {path} is corrupt")]
    ManifestCorrupt {
        /// Manifest part name.
        path: String,
        /// Underlying cause.
        #[source]
        source: ManifestSource,
    },

    /// No identifiers are left. Nothing was written.
    #[error(transparent)]
    Exhausted(#[from] Exhausted),

    /// The package can't be completed.
    #[error(transparent)]
    Fatal(#[from] ImageError),
}

/// Registers image parts and their relationships for one render pass.
#[derive(Debug, Clone, Default)]
pub struct ManifestManager {
    allocator: IdAllocator,
}

impl ManifestManager {
    /// Create a manager drawing identifiers from `allocator`.
    #[must_use]
    pub fn new(allocator: IdAllocator) -> Self {
        Self { allocator }
    }

    /// The identifier counter.
    #[must_use]
    pub fn allocator(&self) -> &IdAllocator {
        &self.allocator
    }

    /// Store an image and reference it from `part`'s relationship manifest.
    ///
    /// The manifest is parsed before anything is written, so a corrupt
    /// manifest leaves the package untouched. Identifiers already used by the
    /// manifest or by an existing media part are skipped. The content type
    /// registry gains a default for the image extension when it lacks one.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::ManifestCorrupt`] if the manifest can't be
    /// read or parsed, [`RegisterError::Exhausted`] if the identifier space
    /// runs out, and [`RegisterError::Fatal`] if the package rejects a write.
    pub fn register_image(
        &mut self,
        package: &mut dyn Package,
        part: &str,
        image: &ResolvedImage,
    ) -> Result<RegisteredImage, RegisterError> {
        let manifest_path = rels_path_for(part);
        let mut manifest = load_manifest(&*package, &manifest_path)?;

        let (allocation, target, media_part) = loop {
            let allocation = self.allocator.allocate()?;
            let target = format!(
                "{MEDIA_DIR}/{}",
                allocation.media_name(image.media.extension)
            );
            let media_part = resolve_target(part, &target);
            if manifest.contains(&allocation.rel_id()) || package.contains(&media_part) {
                tracing::debug!(id = allocation.number(), "Identifier in use, skipping");
                continue;
            }
            break (allocation, target, media_part);
        };

        package
            .write_part(&media_part, image.bytes.clone())
            .map_err(ImageError::from)?;

        let relationship = Relationship {
            id: allocation.rel_id(),
            rel_type: IMAGE_REL_TYPE.to_owned(),
            target,
            target_mode: None,
        };
        manifest.append(relationship.clone());
        package
            .write_part(&manifest_path, manifest.into_string().into_bytes())
            .map_err(ImageError::from)?;

        content_types::ensure_default(package, image.media).map_err(ImageError::from)?;

        tracing::debug!(
            id = %relationship.id,
            media = %media_part,
            bytes = image.bytes.len(),
            "Registered image"
        );
        Ok(RegisteredImage {
            allocation,
            relationship,
            media_part,
        })
    }
}

fn load_manifest(package: &dyn Package, path: &str) -> Result<RelationshipManifest, RegisterError> {
    let corrupt = |source: ManifestSource| RegisterError::ManifestCorrupt {
        path: path.to_owned(),
        source,
    };
    let data = package.read_part(path).map_err(|e| corrupt(e.into()))?;
    let xml = String::from_utf8(data).map_err(|e| corrupt(e.utf8_error().into()))?;
    RelationshipManifest::parse(xml).map_err(|e| corrupt(e.into()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rp_package::{CONTENT_TYPES_PART, MemoryPackage, PackageErrorKind};

    use super::*;
    use crate::media::MediaType;
    use crate::size::{Extent, ImageSize};

    const DOC: &str = "word/document.xml";
    const RELS: &str = "word/_rels/document.xml.rels";
    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    fn manifest_xml(k: usize) -> String {
        let entries: String = (1..=k)
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="part{i}.xml"/>"#
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{entries}</Relationships>"
        )
    }

    fn image() -> ResolvedImage {
        ResolvedImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            size: ImageSize::new(600.0, 400.0),
            extent: Extent::new(5_715_000, 3_810_000).unwrap(),
            media: MediaType::PNG,
        }
    }

    fn package(rels: &str) -> MemoryPackage {
        MemoryPackage::new()
            .with_part(CONTENT_TYPES_PART, CONTENT_TYPES)
            .with_part(DOC, "<w:document/>")
            .with_part(RELS, rels)
    }

    fn seeded_manager(package: &MemoryPackage) -> ManifestManager {
        let ids = package.relationships(RELS).unwrap();
        ManifestManager::new(IdAllocator::seeded(ids.iter().map(|r| r.id.as_str())))
    }

    fn entry(id: &str) -> Relationship {
        Relationship {
            id: id.to_owned(),
            rel_type: IMAGE_REL_TYPE.to_owned(),
            target: format!("media/{id}.png"),
            target_mode: None,
        }
    }

    #[test]
    fn test_append_is_idempotent_per_id() {
        let mut manifest = RelationshipManifest::parse(manifest_xml(2)).unwrap();

        assert!(manifest.append(entry("rId9")));
        assert!(!manifest.append(entry("rId9")));

        let reparsed = parse_relationships(manifest.as_str()).unwrap();
        assert_eq!(reparsed.iter().filter(|r| r.id == "rId9").count(), 1);
        assert_eq!(reparsed.len(), 3);
    }

    #[test]
    fn test_append_to_self_closing_root() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;
        let mut manifest = RelationshipManifest::parse(xml).unwrap();

        assert!(manifest.append(entry("rId1")));
        assert!(manifest.append(entry("rId2")));

        let reparsed = parse_relationships(manifest.as_str()).unwrap();
        assert_eq!(reparsed, vec![entry("rId1"), entry("rId2")]);
    }

    #[test]
    fn test_append_escapes_attributes() {
        let mut manifest = RelationshipManifest::parse(manifest_xml(0)).unwrap();
        let link = Relationship {
            id: "rId1".to_owned(),
            rel_type: "urn:hyperlink".to_owned(),
            target: "https://example.com/?a=1&b=2".to_owned(),
            target_mode: Some("External".to_owned()),
        };
        manifest.append(link.clone());

        assert!(manifest.as_str().contains(r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>"#));
        assert_eq!(parse_relationships(manifest.as_str()).unwrap(), vec![link]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RelationshipManifest::parse("not xml at all <").is_err());
        assert!(RelationshipManifest::parse("<Types/>").is_err());
    }

    #[test]
    fn test_register_round_trip_integrity() {
        let k = 5;
        let original = manifest_xml(k);
        let before = parse_relationships(&original).unwrap();
        let mut package = package(&original);
        let mut manager = seeded_manager(&package);

        let registered = manager.register_image(&mut package, DOC, &image()).unwrap();

        let after = package.relationships(RELS).unwrap();
        assert_eq!(after.len(), k + 1);
        assert_eq!(&after[..k], &before[..]);
        assert_eq!(after[k], registered.relationship);

        let text = package.read_text(RELS).unwrap();
        assert!(text.starts_with(&original[..original.len() - "</Relationships>".len()]));
    }

    #[test]
    fn test_register_writes_media_and_content_type() {
        let mut package = package(&manifest_xml(7));
        let mut manager = seeded_manager(&package);

        let registered = manager.register_image(&mut package, DOC, &image()).unwrap();

        assert_eq!(registered.relationship.id, "rId8");
        assert_eq!(registered.relationship.target, "media/image_rp8.png");
        assert_eq!(registered.media_part, "word/media/image_rp8.png");
        assert_eq!(
            package.read_part("word/media/image_rp8.png").unwrap(),
            image().bytes
        );
        let types = package.read_text(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    }

    #[test]
    fn test_register_n_images_unique() {
        let original = manifest_xml(3);
        let mut package = package(&original);
        let mut manager = seeded_manager(&package);

        let ids: Vec<String> = (0..20)
            .map(|_| {
                manager
                    .register_image(&mut package, DOC, &image())
                    .unwrap()
                    .relationship
                    .id
            })
            .collect();

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 20);
        for old in parse_relationships(&original).unwrap() {
            assert!(!ids.contains(&old.id));
        }
        assert_eq!(package.relationships(RELS).unwrap().len(), 23);
    }

    #[test]
    fn test_register_skips_ids_in_use() {
        let mut package = package(&manifest_xml(1)).with_part("word/media/image_rp2.png", "old");
        let mut manager = ManifestManager::default();

        let registered = manager.register_image(&mut package, DOC, &image()).unwrap();

        assert_eq!(registered.relationship.id, "rId3");
        assert_eq!(package.read_part("word/media/image_rp2.png").unwrap(), b"old");
    }

    #[test]
    fn test_register_missing_manifest_writes_nothing() {
        let mut package = MemoryPackage::new().with_part(DOC, "<w:document/>");
        let mut manager = ManifestManager::default();

        let err = manager.register_image(&mut package, DOC, &image()).unwrap_err();

        assert!(matches!(err, RegisterError::ManifestCorrupt { ref path, .. } if path == RELS));
        assert_eq!(package.write_count(), 0);
    }

    #[test]
    fn test_register_unparsable_manifest_writes_nothing() {
        let mut package = package("<Relationships><Relationship Id=\"rId1\"/></Relationships>");
        let mut manager = ManifestManager::default();

        let err = manager.register_image(&mut package, DOC, &image()).unwrap_err();

        assert!(matches!(
            err,
            RegisterError::ManifestCorrupt {
                source: ManifestSource::Parse(_),
                ..
            }
        ));
        assert_eq!(package.write_count(), 0);
    }

    #[test]
    fn test_register_exhausted_writes_nothing() {
        let mut package = package(&manifest_xml(1));
        let mut manager = ManifestManager::new(IdAllocator::seeded(["rId4294967295"]));

        let err = manager.register_image(&mut package, DOC, &image()).unwrap_err();

        assert!(matches!(err, RegisterError::Exhausted(Exhausted)));
        assert_eq!(package.write_count(), 0);
    }

    #[test]
    fn test_register_write_failure_is_fatal() {
        let mut package = package(&manifest_xml(1)).fail_writes();
        let mut manager = ManifestManager::default();

        let err = manager.register_image(&mut package, DOC, &image()).unwrap_err();

        let RegisterError::Fatal(ImageError::PackageWrite(e)) = err else {
            panic!("expected fatal write error");
        };
        assert_eq!(e.kind, PackageErrorKind::WriteRejected);
    }

    #[test]
    fn test_register_for_header_uses_header_manifest() {
        let mut package = package(&manifest_xml(1))
            .with_part("word/header1.xml", "<w:hdr/>")
            .with_part("word/_rels/header1.xml.rels", manifest_xml(0));
        let mut manager = ManifestManager::new(IdAllocator::seeded(["rId1"]));

        let registered = manager
            .register_image(&mut package, "word/header1.xml", &image())
            .unwrap();

        assert_eq!(registered.media_part, "word/media/image_rp2.png");
        assert_eq!(package.relationships("word/_rels/header1.xml.rels").unwrap().len(), 1);
        assert_eq!(package.relationships(RELS).unwrap().len(), 1);
    }
}
