//! Package assembly
//!
//! The [`Assembler`] collects static parts and generated parts, binds image
//! placeholders, writes per-part relationship files and the content-type
//! manifest, validates the result and serializes it to ZIP bytes. It starts
//! either empty or from a template package whose parts are copied verbatim
//! except those matching the drop patterns.

use mdoffice_model::ImageSet;

use crate::binding::MediaBinder;
use crate::content_types::{ContentTypes, CT_RELATIONSHIPS, CT_XML};
use crate::error::{OoxmlError, Result};
use crate::package::{Package, CONTENT_TYPES_PART};
use crate::relationships::{rels_path_for, resolve_target, Relationships};

/// A part produced by a serializer
#[derive(Debug, Clone)]
pub struct GeneratedPart {
    pub path: String,
    /// Override content type, `None` when the extension default applies
    pub content_type: Option<String>,
    /// XML text, possibly holding image placeholder tokens
    pub xml: String,
    /// Relationships of the part, written to its `_rels` file when non-empty
    pub relationships: Relationships,
}

impl GeneratedPart {
    pub fn new(path: impl Into<String>, content_type: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_type: Some(content_type.into()),
            xml: xml.into(),
            relationships: Relationships::new(),
        }
    }

    pub fn with_relationships(mut self, relationships: Relationships) -> Self {
        self.relationships = relationships;
        self
    }
}

/// Whether a part path matches a drop pattern
///
/// A pattern ending in `/**` matches everything below that directory; any
/// other pattern must match the path exactly.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("**") {
        Some(prefix) => path.starts_with(prefix),
        None => pattern == path,
    }
}

/// Builds one package
#[derive(Debug)]
pub struct Assembler {
    package: Package,
    content_types: ContentTypes,
    generated: Vec<GeneratedPart>,
    /// Directory holding `media/`
    media_root: String,
    from_template: bool,
}

impl Assembler {
    /// Start an empty package
    pub fn new(media_root: impl Into<String>) -> Self {
        Self {
            package: Package::new(),
            content_types: ContentTypes::standard(),
            generated: Vec::new(),
            media_root: media_root.into(),
            from_template: false,
        }
    }

    /// Start from a template package
    ///
    /// Parts matching any of `drop_patterns` are removed together with
    /// their content-type overrides; everything else is kept byte for byte.
    pub fn from_template(template: Package, drop_patterns: &[&str], media_root: impl Into<String>) -> Result<Self> {
        let mut package = template;
        let manifest = package
            .get(CONTENT_TYPES_PART)
            .ok_or_else(|| OoxmlError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
        let mut content_types = ContentTypes::parse(manifest)?;

        let dropped =
            package.remove_matching(|p| drop_patterns.iter().any(|pattern| matches_pattern(pattern, p)));
        content_types
            .retain_overrides(|p| !drop_patterns.iter().any(|pattern| matches_pattern(pattern, p)));
        package.remove(CONTENT_TYPES_PART);
        log::debug!("Template loaded, {} parts kept, {} dropped", package.len(), dropped.len());

        Ok(Self {
            package,
            content_types,
            generated: Vec::new(),
            media_root: media_root.into(),
            from_template: true,
        })
    }

    pub fn is_from_template(&self) -> bool {
        self.from_template
    }

    /// Part of the template or a static part added so far
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.package.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.package.contains(path) || self.generated.iter().any(|g| g.path == path)
    }

    /// Relationships already stored for a part, if any
    pub fn part_relationships(&self, part: &str) -> Result<Option<Relationships>> {
        match self.package.get(&rels_path_for(part)) {
            Some(bytes) => Relationships::parse(bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    /// Add a part that is written verbatim
    pub fn add_static(&mut self, path: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) {
        let path = path.into();
        if let Some(ct) = content_type {
            self.content_types.add_override(&path, ct);
        }
        self.package.set(path, bytes);
    }

    /// Add a generated part, replacing a template part with the same path
    pub fn add_part(&mut self, part: GeneratedPart) {
        if self.package.remove(&part.path).is_some() {
            log::debug!("Generated part replaces template part {}", part.path);
        }
        self.generated.retain(|g| g.path != part.path);
        self.generated.push(part);
    }

    /// Bind images, write every part and return the ZIP bytes
    pub fn assemble(self, images: &ImageSet) -> Result<Vec<u8>> {
        let Assembler {
            mut package,
            mut content_types,
            generated,
            media_root,
            ..
        } = self;

        let mut binder = MediaBinder::new(images, media_root).avoid_existing(&package);

        for mut part in generated {
            let xml = binder.bind_part(&part.path, &part.xml, &mut part.relationships)?;
            if let Some(ct) = &part.content_type {
                content_types.add_override(&part.path, ct);
            }
            package.set(part.path.clone(), xml.into_bytes());

            let rels_path = rels_path_for(&part.path);
            if part.relationships.is_empty() {
                package.remove(&rels_path);
            } else {
                package.set_string(rels_path, part.relationships.to_xml());
            }
        }

        let media_count = binder.finish(&mut package, &mut content_types)?;
        content_types.add_default("rels", CT_RELATIONSHIPS);
        content_types.add_default("xml", CT_XML);

        validate(&package, &content_types)?;

        package.set_string(CONTENT_TYPES_PART, content_types.to_xml());
        let bytes = package.to_bytes()?;
        log::info!(
            "Assembled package: {} parts, {} media files, {} bytes",
            package.len(),
            media_count,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Check packaging rules before anything is written
///
/// Every override names an existing part, every part has a content type,
/// relationship ids are unique per file and internal targets exist.
pub fn validate(package: &Package, content_types: &ContentTypes) -> Result<()> {
    if let Some(missing) = content_types
        .override_parts()
        .find(|p| !package.contains(p))
    {
        return Err(OoxmlError::InvalidPackage(format!(
            "content-type override for missing part /{}",
            missing
        )));
    }

    for path in package.paths().filter(|p| *p != CONTENT_TYPES_PART) {
        if !content_types.covers(path) {
            return Err(OoxmlError::InvalidPackage(format!(
                "part {} has no content type",
                path
            )));
        }

        if let Some(source) = rels_source(path) {
            let rels = package
                .get(path)
                .map(Relationships::parse)
                .transpose()?
                .unwrap_or_default();
            if let Some(id) = rels.duplicate_id() {
                return Err(OoxmlError::InvalidPackage(format!(
                    "duplicate relationship id {} in {}",
                    id, path
                )));
            }
            for rel in rels.iter().filter(|r| r.target_mode.is_none()) {
                let target = resolve_target(&source, &rel.target);
                if !package.contains(&target) {
                    return Err(OoxmlError::InvalidPackage(format!(
                        "relationship {} in {} points to missing part {}",
                        rel.id, path, target
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Part owning a relationship file: `word/_rels/document.xml.rels` → `word/document.xml`
fn rels_source(path: &str) -> Option<String> {
    let i = path.rfind("_rels/")?;
    let file = path[i + "_rels/".len()..].strip_suffix(".rels")?;
    Some(format!("{}{}", &path[..i], file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::placeholder_token;
    use crate::content_types::{CONTENT_TYPES_NS, CT_WORD_DOCUMENT};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n....";

    fn root_rels() -> Relationships {
        let mut rels = Relationships::new();
        rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
        rels
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("ppt/slides/**", "ppt/slides/slide1.xml"));
        assert!(matches_pattern("ppt/slides/**", "ppt/slides/_rels/slide1.xml.rels"));
        assert!(!matches_pattern("ppt/slides/**", "ppt/slideLayouts/slideLayout1.xml"));
        assert!(matches_pattern("word/document.xml", "word/document.xml"));
        assert!(!matches_pattern("word/document.xml", "word/document2.xml"));
    }

    #[test]
    fn test_rels_source() {
        assert_eq!(rels_source("_rels/.rels").as_deref(), Some(""));
        assert_eq!(
            rels_source("word/_rels/document.xml.rels").as_deref(),
            Some("word/document.xml")
        );
        assert_eq!(rels_source("word/document.xml"), None);
    }

    #[test]
    fn test_fresh_package_with_image() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-1", PNG.to_vec());

        let mut assembler = Assembler::new("word");
        assembler.add_part(GeneratedPart {
            path: "_rels/.rels".to_string(),
            content_type: None,
            xml: root_rels().to_xml(),
            relationships: Relationships::new(),
        });
        let xml = format!(r#"<w:document r:embed="{}"/>"#, placeholder_token("img-1"));
        assembler.add_part(
            GeneratedPart::new("word/document.xml", CT_WORD_DOCUMENT, xml)
                .with_relationships(Relationships::with_reserved(2)),
        );

        let bytes = assembler.assemble(&images).unwrap();
        let package = Package::from_bytes(&bytes).unwrap();

        assert_eq!(
            package.get_string("word/document.xml").as_deref(),
            Some(r#"<w:document r:embed="rId3"/>"#)
        );
        assert!(package.contains("word/media/image1.png"));
        let rels = Relationships::parse(package.get("word/_rels/document.xml.rels").unwrap()).unwrap();
        assert_eq!(rels.get("rId3").unwrap().target, "media/image1.png");

        let types = ContentTypes::parse(package.get(CONTENT_TYPES_PART).unwrap()).unwrap();
        assert_eq!(types.default_for("png"), Some("image/png"));
        assert_eq!(types.override_for("word/document.xml"), Some(CT_WORD_DOCUMENT));
    }

    #[test]
    fn test_missing_relationship_target_is_rejected() {
        let mut assembler = Assembler::new("word");
        assembler.add_part(GeneratedPart {
            path: "_rels/.rels".to_string(),
            content_type: None,
            xml: root_rels().to_xml(),
            relationships: Relationships::new(),
        });
        let err = assembler.assemble(&ImageSet::new()).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidPackage(msg) if msg.contains("word/document.xml")));
    }

    #[test]
    fn test_uncovered_extension_is_rejected() {
        let mut assembler = Assembler::new("word");
        assembler.add_static("word/fonts/font1.odttf", None, vec![0]);
        let err = assembler.assemble(&ImageSet::new()).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidPackage(msg) if msg.contains("font1.odttf")));
    }

    #[test]
    fn test_override_without_part_is_rejected() {
        let mut package = Package::new();
        package.set_string("a.xml", "<a/>");
        let mut types = ContentTypes::standard();
        types.add_override("b.xml", "text/xml");
        assert!(validate(&package, &types).is_err());
    }

    #[test]
    fn test_template_parts_dropped_and_kept() {
        let mut template = Package::new();
        template.set_string(
            CONTENT_TYPES_PART,
            format!(
                r#"<Types xmlns="{}"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="x"/><Override PartName="/ppt/theme/theme1.xml" ContentType="y"/></Types>"#,
                CONTENT_TYPES_NS
            ),
        );
        template.set_string("ppt/slides/slide1.xml", "<old/>");
        template.set_string("ppt/slides/_rels/slide1.xml.rels", "<old/>");
        template.set_string("ppt/theme/theme1.xml", "<theme/>");

        let assembler = Assembler::from_template(template, &["ppt/slides/**"], "ppt").unwrap();
        assert!(assembler.is_from_template());
        assert!(!assembler.contains("ppt/slides/slide1.xml"));
        assert_eq!(assembler.part("ppt/theme/theme1.xml"), Some(&b"<theme/>"[..]));
        assert!(assembler.content_types().override_for("ppt/slides/slide1.xml").is_none());
        assert_eq!(assembler.content_types().override_for("ppt/theme/theme1.xml"), Some("y"));

        let bytes = assembler.assemble(&ImageSet::new()).unwrap();
        let package = Package::from_bytes(&bytes).unwrap();
        assert_eq!(package.get_string("ppt/theme/theme1.xml").as_deref(), Some("<theme/>"));
    }

    #[test]
    fn test_template_without_manifest_fails() {
        let template = Package::new();
        let err = Assembler::from_template(template, &[], "word").unwrap_err();
        assert!(matches!(err, OoxmlError::MissingPart(_)));
    }
}
