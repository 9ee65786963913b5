//! PPTX package writer
//!
//! Fresh mode writes a complete deck with a built-in master, theme and one
//! layout per [`SlideLayout`]. Template mode keeps the template's masters,
//! layouts, theme and media, drops its slides and regenerates the slide
//! list of `ppt/presentation.xml`.

use std::path::Path;

use mdoffice_model::{ImageSet, Outline, SlideLayout};
use mdoffice_ooxml::content_types::{CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES};
use mdoffice_ooxml::docx::parts::{core_xml, root_relationships};
use mdoffice_ooxml::docx::writer::title_from_file_name;
use mdoffice_ooxml::relationships::relative_target;
use mdoffice_ooxml::{Assembler, FormatSerializer, GeneratedPart, Relationships};

use crate::constants::*;
use crate::deck::{self, builtin_layout_part};
use crate::error::Result;
use crate::serializer::{NumberedSlide, SlideSerializer};
use crate::style::DeckStyle;
use crate::template::{patch_presentation, strip_slide_relationships, PptxTemplate};

/// Application name written to `docProps/app.xml`
pub const APPLICATION: &str = "mdoffice";

/// Writes presentation packages
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    title: String,
    style: DeckStyle,
    template: Option<PptxTemplate>,
}

impl PptxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presentation title for the core properties
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Use the stem of the target file name as title
    pub fn with_file_name(self, file_name: &str) -> Self {
        self.with_title(title_from_file_name(file_name))
    }

    pub fn with_style(mut self, style: DeckStyle) -> Self {
        self.style = style;
        self
    }

    /// Build on top of a `.pptx`/`.potx` template
    pub fn with_template(mut self, template: PptxTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Load a template from disk and build on top of it
    pub fn with_template_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        Ok(self.with_template(PptxTemplate::from_file(path)?))
    }

    /// Slide size of the deck: the template's, or 16:9
    pub fn slide_size(&self) -> (i64, i64) {
        self.template
            .as_ref()
            .map(|t| t.slide_size)
            .unwrap_or((WIDESCREEN_SLIDE_WIDTH_EMU, WIDESCREEN_SLIDE_HEIGHT_EMU))
    }

    /// Serialize every slide and assemble the deck
    pub fn generate(&self, outline: &Outline, images: &ImageSet) -> Result<Vec<u8>> {
        let slide_size = self.slide_size();
        let serializer = match &self.template {
            Some(template) => {
                SlideSerializer::new(&self.style, slide_size).with_layout_parts(template.layout_parts())
            }
            None => SlideSerializer::new(&self.style, slide_size),
        };

        let mut slides = Vec::with_capacity(outline.len());
        for (i, slide) in outline.iter().enumerate() {
            let index = i + 1;
            let part = serializer.serialize(&NumberedSlide::new(index, slide), images)?;
            slides.push(
                GeneratedPart::new(slide_part(index), CT_SLIDE, part.xml)
                    .with_relationships(part.relationships),
            );
        }

        log::debug!(
            "Assembling deck with {} slides and {} images",
            slides.len(),
            images.len()
        );
        let assembler = match &self.template {
            Some(template) => self.template_assembler(template, slides)?,
            None => self.fresh_assembler(slides, slide_size)?,
        };
        Ok(assembler.assemble(images)?)
    }

    fn creator(&self) -> &str {
        self.style.author().unwrap_or(APPLICATION)
    }

    fn add_properties(&self, assembler: &mut Assembler, slide_count: usize, slide_size: (i64, i64)) {
        assembler.add_static(
            "docProps/core.xml",
            Some(CT_CORE_PROPERTIES),
            core_xml(&self.title, self.creator()).into_bytes(),
        );
        assembler.add_static(
            "docProps/app.xml",
            Some(CT_EXTENDED_PROPERTIES),
            deck::app_xml(APPLICATION, slide_count, slide_size).into_bytes(),
        );
    }

    fn fresh_assembler(&self, slides: Vec<GeneratedPart>, slide_size: (i64, i64)) -> Result<Assembler> {
        let mut assembler = Assembler::new("ppt");

        assembler.add_part(GeneratedPart {
            path: "_rels/.rels".to_string(),
            content_type: None,
            xml: root_relationships(PRESENTATION_PART).to_xml(),
            relationships: Relationships::new(),
        });
        self.add_properties(&mut assembler, slides.len(), slide_size);

        assembler.add_static(
            deck::PRES_PROPS_PART,
            Some(CT_PRES_PROPS),
            deck::pres_props_xml().into_bytes(),
        );
        assembler.add_static(
            deck::VIEW_PROPS_PART,
            Some(CT_VIEW_PROPS),
            deck::view_props_xml().into_bytes(),
        );
        assembler.add_static(
            deck::TABLE_STYLES_PART,
            Some(CT_TABLE_STYLES),
            deck::table_styles_xml().into_bytes(),
        );
        assembler.add_static(
            deck::THEME_PART,
            Some(CT_THEME),
            deck::theme_xml(&self.style).into_bytes(),
        );
        assembler.add_part(
            GeneratedPart::new(deck::MASTER_PART, CT_SLIDE_MASTER, deck::slide_master_xml())
                .with_relationships(deck::slide_master_relationships()),
        );
        for layout in SlideLayout::ALL {
            assembler.add_part(
                GeneratedPart::new(
                    builtin_layout_part(layout),
                    CT_SLIDE_LAYOUT,
                    deck::slide_layout_xml(layout, slide_size),
                )
                .with_relationships(deck::slide_layout_relationships()),
            );
        }

        let mut relationships = deck::presentation_relationships()?;
        let slide_rel_ids = add_slides(&mut assembler, &mut relationships, slides);
        assembler.add_part(
            GeneratedPart::new(
                PRESENTATION_PART,
                CT_PRESENTATION,
                deck::presentation_xml(&slide_rel_ids, slide_size),
            )
            .with_relationships(relationships),
        );
        Ok(assembler)
    }

    fn template_assembler(&self, template: &PptxTemplate, slides: Vec<GeneratedPart>) -> Result<Assembler> {
        let mut assembler =
            Assembler::from_template(template.package().clone(), &TEMPLATE_DROP_PATTERNS, "ppt")?;

        let types = assembler.content_types_mut();
        let normalized = types.replace_type(CT_PRESENTATION_TEMPLATE, CT_PRESENTATION)
            + types.replace_type(CT_PRESENTATION_TEMPLATE_MACRO, CT_PRESENTATION)
            + types.replace_type(CT_PRESENTATION_MACRO, CT_PRESENTATION);
        if normalized > 0 {
            log::debug!("Template main part turned into a presentation part");
        }

        self.add_properties(&mut assembler, slides.len(), template.slide_size);
        if !assembler.contains("_rels/.rels") {
            assembler.add_part(GeneratedPart {
                path: "_rels/.rels".to_string(),
                content_type: None,
                xml: root_relationships(PRESENTATION_PART).to_xml(),
                relationships: Relationships::new(),
            });
        }

        let relationships = assembler
            .part_relationships(PRESENTATION_PART)?
            .unwrap_or_default();
        let mut relationships = strip_slide_relationships(relationships);
        let slide_rel_ids = add_slides(&mut assembler, &mut relationships, slides);

        let original = assembler
            .part(PRESENTATION_PART)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let xml = patch_presentation(&original, &slide_rel_ids)?;
        assembler.add_part(
            GeneratedPart::new(PRESENTATION_PART, CT_PRESENTATION, xml).with_relationships(relationships),
        );

        log::info!(
            "Deck built on template {} with {} slides",
            template.path.as_deref().unwrap_or("<bytes>"),
            slide_rel_ids.len()
        );
        Ok(assembler)
    }
}

/// Register slide parts and their presentation relationships
fn add_slides(
    assembler: &mut Assembler,
    relationships: &mut Relationships,
    slides: Vec<GeneratedPart>,
) -> Vec<String> {
    let mut ids = Vec::with_capacity(slides.len());
    for slide in slides {
        let target = relative_target(PRESENTATION_PART, &slide.path);
        ids.push(relationships.add(target, REL_TYPE_SLIDE));
        log::debug!("Slide part {}", slide.path);
        assembler.add_part(slide);
    }
    ids
}
