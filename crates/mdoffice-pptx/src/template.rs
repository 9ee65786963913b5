//! PPTX/POTX template loading and presentation patching.
//!
//! A template contributes its masters, layouts, theme and media verbatim.
//! Its slides are dropped; the new slides are mapped onto the template
//! layouts that best match their semantic layout, and the presentation
//! part gets a fresh slide id list.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use mdoffice_model::SlideLayout;
use mdoffice_ooxml::{Package, Relationships, CONTENT_TYPES_PART};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::constants::*;
use crate::deck::slide_id_list;
use crate::error::{PptxError, Result};
use crate::layout::LayoutKind;

const LAYOUT_DIR: &str = "ppt/slideLayouts/";

/// A slide layout offered by a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    /// Package path, e.g. `ppt/slideLayouts/slideLayout2.xml`
    pub path: String,

    /// Layout name from `p:cSld/@name`
    pub name: String,

    pub kind: LayoutKind,
}

/// Represents a loaded PPTX/POTX template
#[derive(Debug, Clone)]
pub struct PptxTemplate {
    /// Template file path (if loaded from file)
    pub path: Option<String>,

    /// Slide dimensions (width, height) in EMU
    pub slide_size: (i64, i64),

    layouts: Vec<TemplateLayout>,
    package: Package,
}

impl PptxTemplate {
    /// Load a template from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PptxError::template_not_found(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        let mut template = Self::from_bytes(&data)?;
        template.path = Some(path.display().to_string());
        Ok(template)
    }

    /// Load a template from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(data)
            .map_err(|e| PptxError::invalid_template(format!("not a package: {}", e)))?;

        for required in [CONTENT_TYPES_PART, PRESENTATION_PART] {
            if !package.contains(required) {
                return Err(PptxError::invalid_template(format!("missing part {}", required)));
            }
        }

        let slide_size = match package.get(PRESENTATION_PART) {
            Some(xml) => Self::extract_slide_size(xml)?,
            None => (WIDESCREEN_SLIDE_WIDTH_EMU, WIDESCREEN_SLIDE_HEIGHT_EMU),
        };
        let layouts = Self::extract_layouts(&package)?;
        if layouts.is_empty() {
            return Err(PptxError::invalid_template("no slide layouts"));
        }

        log::debug!(
            "Template with {} layouts, slide size {}x{}",
            layouts.len(),
            slide_size.0,
            slide_size.1
        );
        Ok(Self {
            path: None,
            slide_size,
            layouts,
            package,
        })
    }

    /// Get all layouts
    pub fn layouts(&self) -> &[TemplateLayout] {
        &self.layouts
    }

    /// The template package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Best template layout for a semantic layout
    ///
    /// A layout whose name spells the semantic layout wins; otherwise the
    /// first layout of the most preferred kind. `None` when nothing fits.
    pub fn find_layout(&self, layout: SlideLayout) -> Option<&TemplateLayout> {
        if let Some(named) = self
            .layouts
            .iter()
            .find(|l| l.name.parse::<SlideLayout>().ok() == Some(layout))
        {
            return Some(named);
        }
        LayoutKind::preferred_for(layout)
            .iter()
            .find_map(|kind| self.layouts.iter().find(|l| l.kind == *kind))
    }

    /// Layout part for every semantic layout
    ///
    /// Layouts the template cannot serve use its content layout, or its
    /// first layout when it has none.
    pub fn layout_parts(&self) -> HashMap<SlideLayout, String> {
        let fallback = self
            .find_layout(SlideLayout::Content)
            .or_else(|| self.layouts.first())
            .map(|l| l.path.clone())
            .unwrap_or_default();

        SlideLayout::ALL
            .iter()
            .map(|&layout| {
                let path = match self.find_layout(layout) {
                    Some(found) => found.path.clone(),
                    None => {
                        log::warn!(
                            "Template has no layout for {} slides, using {}",
                            layout,
                            fallback
                        );
                        fallback.clone()
                    }
                };
                (layout, path)
            })
            .collect()
    }

    /// Extract slide size from presentation.xml
    fn extract_slide_size(xml: &[u8]) -> Result<(i64, i64)> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut width = WIDESCREEN_SLIDE_WIDTH_EMU;
        let mut height = WIDESCREEN_SLIDE_HEIGHT_EMU;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sldSz" => {
                    for attr in e.attributes().flatten() {
                        let value = std::str::from_utf8(&attr.value).ok().and_then(|v| v.parse().ok());
                        match (attr.key.as_ref(), value) {
                            (b"cx", Some(v)) => width = v,
                            (b"cy", Some(v)) => height = v,
                            _ => {}
                        }
                    }
                    break;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((width, height))
    }

    /// Extract layouts from the slideLayouts directory, ordered by number
    fn extract_layouts(package: &Package) -> Result<Vec<TemplateLayout>> {
        let mut layouts = Vec::new();

        let paths: Vec<&str> = package
            .paths()
            .filter(|p| {
                p.strip_prefix(LAYOUT_DIR)
                    .is_some_and(|name| name.ends_with(".xml") && !name.contains('/'))
            })
            .collect();

        for path in paths {
            if let Some(xml) = package.get(path) {
                layouts.push(Self::parse_layout_xml(path, xml)?);
            }
        }

        layouts.sort_by_key(|l| (layout_number(&l.path), l.path.clone()));
        Ok(layouts)
    }

    /// Parse a single layout part
    fn parse_layout_xml(path: &str, xml: &[u8]) -> Result<TemplateLayout> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut kind = LayoutKind::Custom;
        let mut name = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"sldLayout" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                if let Ok(t) = std::str::from_utf8(&attr.value) {
                                    kind = LayoutKind::from_ooxml_type(t);
                                }
                            }
                        }
                    }
                    b"cSld" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"name" {
                                if let Ok(value) = attr.unescape_value() {
                                    name = value.into_owned();
                                }
                            }
                        }
                        break;
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        // Infer layout kind from name if the type attribute did not tell
        if kind == LayoutKind::Custom {
            kind = LayoutKind::infer_from_name(&name);
        }
        if name.is_empty() {
            name = format!("Layout {}", layout_number(path));
        }

        Ok(TemplateLayout {
            path: path.to_string(),
            name,
            kind,
        })
    }
}

/// Number in a layout file name, `slideLayout12.xml` → 12
fn layout_number(path: &str) -> u32 {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_start_matches("slideLayout")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

/// Template presentation relationships without the old slides
///
/// New ids continue after the highest id the template used.
pub fn strip_slide_relationships(mut rels: Relationships) -> Relationships {
    let removed = rels.remove_where(|r| r.rel_type == REL_TYPE_SLIDE);
    if !removed.is_empty() {
        log::debug!("Dropped {} template slide relationships", removed.len());
    }
    rels
}

/// Replace the slide id list of a presentation part
///
/// The old list and custom shows (which reference old slides) are
/// removed; the new list is written where the old one was, or before
/// `p:sldSz`, or before the end of the root element.
pub fn patch_presentation(xml: &[u8], slide_rel_ids: &[String]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();

    let new_list = if slide_rel_ids.is_empty() {
        String::new()
    } else {
        slide_id_list(slide_rel_ids)
    };
    let mut inserted = false;
    // Depth inside an element being skipped
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        let mut drop_event = false;
        match &event {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldIdLst" | b"custShowLst" => {
                    if e.local_name().as_ref() == b"sldIdLst" && !inserted {
                        writer.get_mut().write_all(new_list.as_bytes())?;
                        inserted = true;
                    }
                    if matches!(event, Event::Start(_)) {
                        skipping = 1;
                    }
                    drop_event = true;
                }
                b"sldSz" if !inserted => {
                    writer.get_mut().write_all(new_list.as_bytes())?;
                    inserted = true;
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"presentation" && !inserted => {
                writer.get_mut().write_all(new_list.as_bytes())?;
                inserted = true;
            }
            Event::Eof => break,
            _ => {}
        }
        if !drop_event {
            writer.write_event(event)?;
        }
        buf.clear();
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| PptxError::invalid_template(format!("presentation part is not UTF-8: {}", e)))
}
