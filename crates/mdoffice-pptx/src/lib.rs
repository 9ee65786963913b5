//! # mdoffice-pptx
//!
//! Slide deck (PPTX) generation from Markdown outlines.
//!
//! An [`Outline`](mdoffice_model::Outline) produced by the outline parser is
//! turned into one slide part per slide by the [`SlideSerializer`], then
//! packaged by the shared assembler either with built-in masters, layouts
//! and theme or on top of a corporate `.pptx`/`.potx` template.
//!
//! ## Features
//!
//! - **Seven semantic layouts**: title, content, quote, closing, section,
//!   two columns and picture slides, each with fixed shape frames
//! - **Template injection**: template parts are kept verbatim, slides are
//!   replaced and mapped onto the closest template layouts
//! - **Deck style**: theme colour, font family and locale
//!
//! ## Example
//!
//! ```
//! use mdoffice_core::parse_outline;
//! use mdoffice_model::ImageSet;
//! use mdoffice_pptx::PptxWriter;
//!
//! let outline = parse_outline("# Quarterly review\n## Agenda\n- Results\n- Plans");
//! let bytes = PptxWriter::new()
//!     .with_file_name("review.pptx")
//!     .generate(&outline, &ImageSet::new())
//!     .unwrap();
//! assert!(!bytes.is_empty());
//! ```

pub mod deck;
pub mod error;
pub mod layout;
pub mod serializer;
pub mod style;
pub mod template;
pub mod writer;

// Re-exports
pub use error::{PptxError, Result};
pub use layout::{Frame, LayoutKind, ShapeFrames};
pub use serializer::{NumberedSlide, SlideSerializer};
pub use style::DeckStyle;
pub use template::{PptxTemplate, TemplateLayout};
pub use writer::PptxWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PPTX-related constants
pub mod constants {
    /// 4:3 slide width in EMU (10")
    pub const STANDARD_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// 4:3 slide height in EMU (7.5")
    pub const STANDARD_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// Widescreen 16:9 slide width in EMU (13.333" width)
    pub const WIDESCREEN_SLIDE_WIDTH_EMU: i64 = 12_192_000;

    /// Widescreen 16:9 slide height in EMU (7.5" height)
    pub const WIDESCREEN_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// EMU per pixel at 96 DPI
    pub const EMU_PER_PIXEL: i64 = 9_525;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Notes slide relationship type
    pub const REL_TYPE_NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    pub const REL_TYPE_PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

    pub const REL_TYPE_VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";

    pub const REL_TYPE_TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

    /// Main part of a presentation
    pub const CT_PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

    /// Main part of a `.potx` template
    pub const CT_PRESENTATION_TEMPLATE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

    /// Main part of a macro-enabled presentation or template
    pub const CT_PRESENTATION_MACRO: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
    pub const CT_PRESENTATION_TEMPLATE_MACRO: &str =
        "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";

    pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const CT_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const CT_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const CT_PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const CT_VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const CT_TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";

    /// Presentation part
    pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

    /// Presentation relationships: master, theme, presProps, viewProps, tableStyles
    pub const PRESENTATION_RESERVED_RELATIONSHIPS: u32 = 5;

    /// Slide relationships: the slide layout
    pub const SLIDE_RESERVED_RELATIONSHIPS: u32 = 1;

    /// First id of the slide id list
    pub const FIRST_SLIDE_ID: u32 = 256;

    /// Id of the first slide master, layout ids follow it
    pub const FIRST_MASTER_ID: u32 = 2_147_483_648;

    /// Parts replaced when building on a template
    pub const TEMPLATE_DROP_PATTERNS: [&str; 2] = ["ppt/slides/**", "ppt/notesSlides/**"];

    /// Run language when the style sets none
    pub const DEFAULT_LOCALE: &str = "en-US";

    /// Path of the n-th slide (1-based)
    pub fn slide_part(index: usize) -> String {
        format!("ppt/slides/slide{}.xml", index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_constants() {
        // 1 inch = 72 points = 96 pixels
        assert_eq!(constants::EMU_PER_INCH, 72 * constants::EMU_PER_POINT);
        assert_eq!(constants::EMU_PER_INCH, 96 * constants::EMU_PER_PIXEL);
    }

    #[test]
    fn test_standard_slide_dimensions() {
        let expected_width = 10 * constants::EMU_PER_INCH;
        let expected_height = (7.5 * constants::EMU_PER_INCH as f64) as i64;

        assert_eq!(constants::STANDARD_SLIDE_WIDTH_EMU, expected_width);
        assert_eq!(constants::STANDARD_SLIDE_HEIGHT_EMU, expected_height);
    }

    #[test]
    fn test_widescreen_dimensions() {
        let aspect_ratio = constants::WIDESCREEN_SLIDE_WIDTH_EMU as f64
            / constants::WIDESCREEN_SLIDE_HEIGHT_EMU as f64;

        assert!((aspect_ratio - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn test_slide_part() {
        assert_eq!(constants::slide_part(3), "ppt/slides/slide3.xml");
    }
}
