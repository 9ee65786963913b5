//! DOCX package writer
//!
//! Fresh mode writes a complete package with built-in styles and
//! numbering. Template mode keeps every part of a `.docx`/`.dotx` file
//! byte for byte except `word/document.xml`, which is regenerated; image
//! relationships continue after the highest id already used by the
//! template's document relationships.

use std::path::Path;

use mdoffice_model::{ElementDocument, ImageSet};

use super::parts::{app_xml, core_xml, numbering_xml, root_relationships, styles_xml};
use super::serializer::DocxSerializer;
use super::{DOCUMENT_PART, NUMBERING_PART, STYLES_PART};
use crate::assembler::{Assembler, GeneratedPart};
use crate::content_types::{
    CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES, CT_WORD_DOCUMENT, CT_WORD_NUMBERING, CT_WORD_STYLES,
    CT_WORD_TEMPLATE,
};
use crate::error::Result;
use crate::package::Package;
use crate::relationships::Relationships;
use crate::serializer::FormatSerializer;

/// Main content type of a macro-enabled Word template
const CT_WORD_TEMPLATE_MACRO: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

/// Application name written to `docProps/app.xml`
pub const APPLICATION: &str = "mdoffice";

/// Writes word-processing packages
#[derive(Debug, Clone)]
pub struct DocxWriter {
    title: String,
    creator: String,
    template: Option<Package>,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            creator: APPLICATION.to_string(),
            template: None,
        }
    }

    /// Document title for the core properties
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Use the stem of the target file name as title
    pub fn with_file_name(self, file_name: &str) -> Self {
        self.with_title(title_from_file_name(file_name))
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Build on top of a template package
    pub fn with_template(mut self, template: Package) -> Self {
        self.template = Some(template);
        self
    }

    /// Load a `.docx`/`.dotx` template from disk
    pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Package> {
        let path = path.as_ref();
        Package::open(path).map_err(|e| e.in_template(path.display().to_string()))
    }

    /// Serialize and assemble the document
    pub fn generate(&self, doc: &ElementDocument, images: &ImageSet) -> Result<Vec<u8>> {
        let part = DocxSerializer::new().serialize(doc, images)?;

        let assembler = match &self.template {
            Some(template) => self.template_assembler(template.clone(), part.xml)?,
            None => self.fresh_assembler(part.xml, part.relationships),
        };

        log::debug!(
            "Assembling document with {} blocks and {} images",
            doc.blocks.len(),
            images.len()
        );
        assembler.assemble(images)
    }

    fn fresh_assembler(&self, xml: String, relationships: Relationships) -> Assembler {
        let mut assembler = Assembler::new("word");

        assembler.add_part(GeneratedPart {
            path: "_rels/.rels".to_string(),
            content_type: None,
            xml: root_relationships(DOCUMENT_PART).to_xml(),
            relationships: Relationships::new(),
        });
        assembler.add_static(
            "docProps/core.xml",
            Some(CT_CORE_PROPERTIES),
            core_xml(&self.title, &self.creator).into_bytes(),
        );
        assembler.add_static(
            "docProps/app.xml",
            Some(CT_EXTENDED_PROPERTIES),
            app_xml(APPLICATION).into_bytes(),
        );
        assembler.add_static(STYLES_PART, Some(CT_WORD_STYLES), styles_xml().into_bytes());
        assembler.add_static(
            NUMBERING_PART,
            Some(CT_WORD_NUMBERING),
            numbering_xml().into_bytes(),
        );
        assembler.add_part(
            GeneratedPart::new(DOCUMENT_PART, CT_WORD_DOCUMENT, xml).with_relationships(relationships),
        );
        assembler
    }

    fn template_assembler(&self, template: Package, xml: String) -> Result<Assembler> {
        let mut assembler = Assembler::from_template(template, &[DOCUMENT_PART], "word")?;

        let types = assembler.content_types_mut();
        let normalized = types.replace_type(CT_WORD_TEMPLATE, CT_WORD_DOCUMENT)
            + types.replace_type(CT_WORD_TEMPLATE_MACRO, CT_WORD_DOCUMENT);
        if normalized > 0 {
            log::debug!("Template main part turned into a document part");
        }

        let mut relationships = assembler
            .part_relationships(DOCUMENT_PART)?
            .unwrap_or_default();

        if relationships.find_by_type(Relationships::TYPE_STYLES).is_none() {
            if !assembler.contains(STYLES_PART) {
                assembler.add_static(STYLES_PART, Some(CT_WORD_STYLES), styles_xml().into_bytes());
            }
            relationships.add("styles.xml", Relationships::TYPE_STYLES);
        }
        if relationships
            .find_by_type(Relationships::TYPE_NUMBERING)
            .is_none()
        {
            if !assembler.contains(NUMBERING_PART) {
                assembler.add_static(
                    NUMBERING_PART,
                    Some(CT_WORD_NUMBERING),
                    numbering_xml().into_bytes(),
                );
            }
            relationships.add("numbering.xml", Relationships::TYPE_NUMBERING);
        }

        assembler.add_part(
            GeneratedPart::new(DOCUMENT_PART, CT_WORD_DOCUMENT, xml).with_relationships(relationships),
        );
        Ok(assembler)
    }
}

/// File stem of a target file name, `report.docx` → `report`
pub fn title_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
