//! `[Content_Types].xml` handling
//!
//! Every part of a package needs a content type, declared either by a
//! `Default` for its extension or by an `Override` for its exact path.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, XML_DECLARATION};

/// Namespace of the content-type manifest
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";
pub const CT_WORD_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const CT_WORD_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const CT_WORD_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const CT_WORD_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// Parsed or generated content-type manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// `(extension, content type)`, extension lowercase without dot
    defaults: Vec<(String, String)>,
    /// `(part path without leading slash, content type)`
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest with the `xml` and `rels` defaults every package needs
    pub fn standard() -> Self {
        let mut types = Self::new();
        types.add_default("rels", CT_RELATIONSHIPS);
        types.add_default("xml", CT_XML);
        types
    }

    /// Parse `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => {
                                key = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"ContentType" => {
                                content_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    match (e.local_name().as_ref(), key, content_type) {
                        (b"Default", Some(ext), Some(ct)) => types.add_default(&ext, &ct),
                        (b"Override", Some(part), Some(ct)) => types.add_override(&part, &ct),
                        (b"Default" | b"Override", _, _) => {
                            return Err(OoxmlError::InvalidPackage(
                                "content-type entry without key or type".to_string(),
                            ))
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Declare a default for an extension; an existing default is kept
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        if self.default_for(&ext).is_none() {
            self.defaults.push((ext, content_type.to_string()));
        }
    }

    /// Declare or replace the override of a part
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let part = normalize_part(part);
        match self.overrides.iter_mut().find(|(p, _)| *p == part) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((part, content_type.to_string())),
        }
    }

    /// Remove the override of a part, returning its content type
    pub fn remove_override(&mut self, part: &str) -> Option<String> {
        let part = normalize_part(part);
        let index = self.overrides.iter().position(|(p, _)| *p == part)?;
        Some(self.overrides.remove(index).1)
    }

    /// Drop every override whose part matches the predicate
    pub fn retain_overrides<F: Fn(&str) -> bool>(&mut self, keep: F) {
        self.overrides.retain(|(p, _)| keep(p));
    }

    /// Replace one content type by another on every override
    ///
    /// Used to turn a template's main part (`.dotx`, `.potx`) into a
    /// document's main part.
    pub fn replace_type(&mut self, from: &str, to: &str) -> usize {
        let mut count = 0;
        for entry in self.overrides.iter_mut().filter(|(_, ct)| ct == from) {
            entry.1 = to.to_string();
            count += 1;
        }
        count
    }

    pub fn default_for(&self, extension: &str) -> Option<&str> {
        let ext = extension.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn override_for(&self, part: &str) -> Option<&str> {
        let part = normalize_part(part);
        self.overrides
            .iter()
            .find(|(p, _)| *p == part)
            .map(|(_, ct)| ct.as_str())
    }

    /// Effective content type of a part
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        self.override_for(part)
            .or_else(|| extension_of(part).and_then(|ext| self.default_for(ext)))
    }

    /// Whether a part has a declared content type
    pub fn covers(&self, part: &str) -> bool {
        self.content_type_of(part).is_some()
    }

    /// Override part paths, without leading slash
    pub fn override_parts(&self) -> impl Iterator<Item = &str> {
        self.overrides.iter().map(|(p, _)| p.as_str())
    }

    /// Serialize to `[Content_Types].xml`
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        xml.push('\n');
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                "  <Override PartName=\"/{}\" ContentType=\"{}\"/>\n",
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

fn normalize_part(part: &str) -> String {
    part.trim_start_matches('/').to_string()
}

/// Lowercase-insensitive extension of a part path
pub fn extension_of(part: &str) -> Option<&str> {
    let name = part.rsplit('/').next().unwrap_or(part);
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => Some(&name[i + 1..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="JPEG" ContentType="image/jpeg"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

    #[test]
    fn test_parse_template_types() {
        let types = ContentTypes::parse(TEMPLATE_TYPES.as_bytes()).unwrap();
        assert_eq!(types.default_for("jpeg"), Some("image/jpeg"));
        assert_eq!(types.override_for("word/document.xml"), Some(CT_WORD_TEMPLATE));
        assert_eq!(types.override_for("/word/styles.xml"), Some(CT_WORD_STYLES));
    }

    #[test]
    fn test_replace_template_main_type() {
        let mut types = ContentTypes::parse(TEMPLATE_TYPES.as_bytes()).unwrap();
        assert_eq!(types.replace_type(CT_WORD_TEMPLATE, CT_WORD_DOCUMENT), 1);
        assert_eq!(types.override_for("word/document.xml"), Some(CT_WORD_DOCUMENT));
    }

    #[test]
    fn test_covers_by_default_or_override() {
        let mut types = ContentTypes::standard();
        types.add_override("/docProps/core.xml", CT_CORE_PROPERTIES);
        assert!(types.covers("word/document.xml"));
        assert!(types.covers("_rels/.rels"));
        assert!(!types.covers("word/media/image1.png"));
        assert_eq!(
            types.content_type_of("docProps/core.xml"),
            Some(CT_CORE_PROPERTIES)
        );
        types.add_default("png", "image/png");
        assert!(types.covers("word/media/image1.PNG"));
    }

    #[test]
    fn test_overrides_are_unique() {
        let mut types = ContentTypes::new();
        types.add_override("a.xml", "x");
        types.add_override("/a.xml", "y");
        assert_eq!(types.override_parts().count(), 1);
        assert_eq!(types.remove_override("a.xml").as_deref(), Some("y"));
        assert!(types.remove_override("a.xml").is_none());
    }

    #[test]
    fn test_xml_uses_leading_slash() {
        let mut types = ContentTypes::standard();
        types.add_override("word/document.xml", CT_WORD_DOCUMENT);
        let xml = types.to_xml();
        assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));
        assert!(xml.contains(r#"<Default Extension="rels""#));

        let reparsed = ContentTypes::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed, types);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("_rels/.rels"), Some("rels"));
        assert_eq!(extension_of("word/media/image1.png"), Some("png"));
        assert_eq!(extension_of("mimetype"), None);
    }
}
