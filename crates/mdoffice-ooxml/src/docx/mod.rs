//! Word-processing (`.docx`) output
//!
//! [`DocxSerializer`] turns an element document into `word/document.xml`;
//! [`DocxWriter`] assembles it with styles, numbering and properties into a
//! complete package, either fresh or on top of a `.docx`/`.dotx` template.

pub mod parts;
pub mod serializer;
pub mod writer;

pub use serializer::{DocxSerializer, NUM_ID_BULLET, NUM_ID_DECIMAL};
pub use writer::DocxWriter;

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";

/// rId1 styles, rId2 numbering
pub const RESERVED_RELATIONSHIPS: u32 = 2;

pub const EMU_PER_PIXEL: u64 = 9525;
pub const EMU_PER_TWIP: u64 = 635;

pub const A4_WIDTH_TWIPS: u32 = 11906;
pub const A4_HEIGHT_TWIPS: u32 = 16838;
pub const MARGIN_TWIPS: u32 = 1440;
/// A4 width minus both margins
pub const TEXT_WIDTH_TWIPS: u32 = A4_WIDTH_TWIPS - 2 * MARGIN_TWIPS;
