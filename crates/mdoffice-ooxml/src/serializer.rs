//! Format serializer seam
//!
//! The Word and slide pipelines share the model, the projector and the
//! assembler; they differ only in the serializer that turns model values
//! into part XML.

use mdoffice_model::ImageSet;

use crate::error::Result;
use crate::relationships::Relationships;

/// XML of one part together with its relationships
///
/// Image references inside `xml` are placeholder tokens; the assembler
/// appends the matching image relationships after the reserved entries.
#[derive(Debug, Clone)]
pub struct SerializedPart {
    pub xml: String,
    pub relationships: Relationships,
}

/// Turns one model value into the XML of one part
pub trait FormatSerializer<T: ?Sized> {
    fn serialize(&self, input: &T, images: &ImageSet) -> Result<SerializedPart>;
}
