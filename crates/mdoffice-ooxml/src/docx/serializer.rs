//! Word serializer: element document to `word/document.xml`

use mdoffice_model::{Block, Cell, ElementDocument, ImageSet, Run};

use super::parts::style_ids;
use super::{
    A4_HEIGHT_TWIPS, A4_WIDTH_TWIPS, EMU_PER_PIXEL, EMU_PER_TWIP, MARGIN_TWIPS, RESERVED_RELATIONSHIPS,
    TEXT_WIDTH_TWIPS,
};
use crate::binding::placeholder_token;
use crate::error::{OoxmlError, Result};
use crate::relationships::Relationships;
use crate::serializer::{FormatSerializer, SerializedPart};
use crate::xml::{escape_xml, XML_DECLARATION};

/// Bullet list numbering instance
pub const NUM_ID_BULLET: u32 = 1;
/// Decimal list numbering instance
pub const NUM_ID_DECIMAL: u32 = 2;

/// Size used when the image header cannot be read (6.25 x 4.17 inches)
const FALLBACK_EXTENT: (u64, u64) = (5_715_000, 3_810_000);

/// Serializes an [`ElementDocument`] into WordprocessingML
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxSerializer;

impl DocxSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Reserved entries of the document part: rId1 styles, rId2 numbering
    pub fn reserved_relationships() -> Result<Relationships> {
        let mut rels = Relationships::with_reserved(RESERVED_RELATIONSHIPS);
        rels.insert("rId1", "styles.xml", Relationships::TYPE_STYLES)?;
        rels.insert("rId2", "numbering.xml", Relationships::TYPE_NUMBERING)?;
        Ok(rels)
    }
}

impl FormatSerializer<ElementDocument> for DocxSerializer {
    fn serialize(&self, doc: &ElementDocument, images: &ImageSet) -> Result<SerializedPart> {
        let mut body = BodyWriter::new(images);
        body.generate_document(doc)?;
        Ok(SerializedPart {
            xml: body.output,
            relationships: Self::reserved_relationships()?,
        })
    }
}

struct BodyWriter<'a> {
    images: &'a ImageSet,
    output: String,
    next_drawing_id: usize,
}

impl<'a> BodyWriter<'a> {
    fn new(images: &'a ImageSet) -> Self {
        Self {
            images,
            output: String::new(),
            next_drawing_id: 1,
        }
    }

    fn generate_document(&mut self, doc: &ElementDocument) -> Result<()> {
        self.output.push_str(XML_DECLARATION);
        self.output.push('\n');
        self.output.push_str(r#"<w:document "#);
        self.output
            .push_str(r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#);
        self.output.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        self.output.push_str(
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
        );
        self.output
            .push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        self.output
            .push_str(r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#);
        self.output.push('\n');
        self.output.push_str("<w:body>\n");

        for block in &doc.blocks {
            self.generate_block(block)?;
        }

        self.generate_section_properties();
        self.output.push_str("</w:body>\n");
        self.output.push_str("</w:document>");
        Ok(())
    }

    fn generate_block(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::Heading { level, text } => {
                let index = (*level).clamp(1, 3) as usize - 1;
                self.open_paragraph(style_ids::HEADINGS[index]);
                self.generate_text_run(text, &Run::default());
                self.output.push_str("</w:p>\n");
            }
            Block::Paragraph { runs } => {
                self.open_paragraph(style_ids::NORMAL);
                self.generate_runs(runs);
                self.output.push_str("</w:p>\n");
            }
            Block::Quote { text } => {
                self.open_paragraph(style_ids::QUOTE);
                self.generate_text_run(text, &Run::default());
                self.output.push_str("</w:p>\n");
            }
            Block::List { ordered, items } => self.generate_list(*ordered, items, 0)?,
            Block::Table {
                rows,
                header_row_count,
            } => self.generate_table(rows, *header_row_count)?,
            Block::Image { id, alt } => self.generate_drawing(id, alt),
            Block::Raw { text, .. } => {
                self.open_paragraph(style_ids::CODE);
                self.generate_text_run(text, &Run::default());
                self.output.push_str("</w:p>\n");
            }
        }
        Ok(())
    }

    fn open_paragraph(&mut self, style: &str) {
        self.output.push_str("<w:p>\n");
        self.output.push_str("<w:pPr>\n");
        self.output
            .push_str(&format!("<w:pStyle w:val=\"{}\"/>\n", escape_xml(style)));
        self.output.push_str("</w:pPr>\n");
    }

    fn generate_list(&mut self, ordered: bool, items: &[Block], depth: usize) -> Result<()> {
        let num_id = if ordered { NUM_ID_DECIMAL } else { NUM_ID_BULLET };
        let level = depth.min(8);

        for item in items {
            match item {
                Block::Paragraph { runs } => {
                    self.output.push_str("<w:p>\n");
                    self.output.push_str("<w:pPr>\n");
                    self.output.push_str(&format!(
                        "<w:pStyle w:val=\"{}\"/>\n",
                        style_ids::LIST_PARAGRAPH
                    ));
                    self.output.push_str("<w:numPr>\n");
                    self.output
                        .push_str(&format!("<w:ilvl w:val=\"{}\"/>\n", level));
                    self.output
                        .push_str(&format!("<w:numId w:val=\"{}\"/>\n", num_id));
                    self.output.push_str("</w:numPr>\n");
                    self.output.push_str("</w:pPr>\n");
                    self.generate_runs(runs);
                    self.output.push_str("</w:p>\n");
                }
                Block::List { ordered, items } => self.generate_list(*ordered, items, depth + 1)?,
                // Other content inside an item is rendered as a normal block
                other => self.generate_block(other)?,
            }
        }
        Ok(())
    }

    fn generate_table(&mut self, rows: &[Vec<Cell>], header_row_count: usize) -> Result<()> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            return Err(OoxmlError::MalformedElement(
                "table has no columns".to_string(),
            ));
        }

        let grid_width = TEXT_WIDTH_TWIPS / columns as u32;
        let cell_pct = 5000 / columns as u32;

        self.output.push_str("<w:tbl>\n");
        self.output.push_str("<w:tblPr>\n");
        self.output.push_str(&format!(
            "<w:tblStyle w:val=\"{}\"/>\n",
            style_ids::TABLE_GRID
        ));
        self.output
            .push_str("<w:tblW w:w=\"5000\" w:type=\"pct\"/>\n");
        self.output.push_str("<w:tblLook w:val=\"04A0\" w:firstRow=\"1\" w:lastRow=\"0\" w:firstColumn=\"0\" w:lastColumn=\"0\" w:noHBand=\"0\" w:noVBand=\"1\"/>\n");
        self.output.push_str("</w:tblPr>\n");

        self.output.push_str("<w:tblGrid>\n");
        for _ in 0..columns {
            self.output
                .push_str(&format!("<w:gridCol w:w=\"{}\"/>\n", grid_width));
        }
        self.output.push_str("</w:tblGrid>\n");

        let empty = Cell::empty();
        for (index, row) in rows.iter().enumerate() {
            let is_header = index < header_row_count;
            self.output.push_str("<w:tr>\n");
            if is_header {
                self.output.push_str("<w:trPr>\n");
                self.output.push_str("<w:tblHeader/>\n");
                self.output.push_str("</w:trPr>\n");
            }

            for col in 0..columns {
                let cell = row.get(col).unwrap_or(&empty);
                let header_cell = is_header || cell.header;

                self.output.push_str("<w:tc>\n");
                self.output.push_str("<w:tcPr>\n");
                self.output.push_str(&format!(
                    "<w:tcW w:w=\"{}\" w:type=\"pct\"/>\n",
                    cell_pct
                ));
                if header_cell {
                    self.output
                        .push_str("<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"D9D9D9\"/>\n");
                }
                self.output.push_str("</w:tcPr>\n");

                // Every cell needs at least one paragraph
                self.output.push_str("<w:p>\n");
                for run in &cell.runs {
                    if header_cell {
                        let bold = Run {
                            bold: true,
                            ..run.clone()
                        };
                        self.generate_text_run(&bold.text, &bold);
                    } else {
                        self.generate_text_run(&run.text, run);
                    }
                }
                self.output.push_str("</w:p>\n");
                self.output.push_str("</w:tc>\n");
            }

            self.output.push_str("</w:tr>\n");
        }

        self.output.push_str("</w:tbl>\n");
        // Word needs a paragraph between adjacent tables
        self.output.push_str("<w:p/>\n");
        Ok(())
    }

    fn generate_runs(&mut self, runs: &[Run]) {
        for run in runs {
            self.generate_text_run(&run.text, run);
        }
    }

    /// One run per line; lines are joined by `w:br`
    fn generate_text_run(&mut self, text: &str, style: &Run) {
        self.output.push_str("<w:r>\n");
        if style.bold || style.italic || style.code {
            self.output.push_str("<w:rPr>\n");
            if style.code {
                self.output
                    .push_str("<w:rFonts w:ascii=\"Consolas\" w:hAnsi=\"Consolas\" w:cs=\"Consolas\"/>\n");
            }
            if style.bold {
                self.output.push_str("<w:b/>\n");
            }
            if style.italic {
                self.output.push_str("<w:i/>\n");
            }
            self.output.push_str("</w:rPr>\n");
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.output.push_str("<w:br/>\n");
            }
            self.output.push_str(&format!(
                "<w:t xml:space=\"preserve\">{}</w:t>\n",
                escape_xml(line)
            ));
        }
        self.output.push_str("</w:r>\n");
    }

    fn generate_drawing(&mut self, id: &str, alt: &str) {
        let (cx, cy) = self.extent_of(id);
        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;

        self.output.push_str("<w:p>\n");
        self.output.push_str("<w:pPr><w:jc w:val=\"center\"/></w:pPr>\n");
        self.output.push_str("  <w:r>\n");
        self.output.push_str("    <w:drawing>\n");
        self.output.push_str(&format!(
            r#"      <wp:inline distT="0" distB="0" distL="0" distR="0">
        <wp:extent cx="{cx}" cy="{cy}"/>
        <wp:docPr id="{id}" name="Picture {id}" descr="{descr}"/>
        <a:graphic>
          <a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">
            <pic:pic>
              <pic:nvPicPr>
                <pic:cNvPr id="{id}" name="Picture {id}"/>
                <pic:cNvPicPr/>
              </pic:nvPicPr>
              <pic:blipFill>
                <a:blip r:embed="{embed}"/>
                <a:stretch><a:fillRect/></a:stretch>
              </pic:blipFill>
              <pic:spPr>
                <a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
                <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
              </pic:spPr>
            </pic:pic>
          </a:graphicData>
        </a:graphic>
      </wp:inline>
"#,
            cx = cx,
            cy = cy,
            id = drawing_id,
            descr = escape_xml(alt),
            embed = placeholder_token(id),
        ));
        self.output.push_str("    </w:drawing>\n");
        self.output.push_str("  </w:r>\n");
        self.output.push_str("</w:p>\n");

        if !alt.trim().is_empty() {
            self.open_paragraph(style_ids::CAPTION);
            self.generate_text_run(alt, &Run::default());
            self.output.push_str("</w:p>\n");
        }
    }

    /// Natural size at 96 dpi, scaled down to the text width
    fn extent_of(&self, id: &str) -> (u64, u64) {
        let Some((w, h)) = self.images.get(id).and_then(|a| a.pixel_size()) else {
            return FALLBACK_EXTENT;
        };
        let max_width = TEXT_WIDTH_TWIPS as u64 * EMU_PER_TWIP;
        let cx = w as u64 * EMU_PER_PIXEL;
        let cy = h as u64 * EMU_PER_PIXEL;
        if cx <= max_width {
            (cx, cy)
        } else {
            (max_width, cy * max_width / cx)
        }
    }

    fn generate_section_properties(&mut self) {
        self.output.push_str("<w:sectPr>\n");
        self.output.push_str(&format!(
            "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>\n",
            A4_WIDTH_TWIPS, A4_HEIGHT_TWIPS
        ));
        self.output.push_str(&format!(
            "<w:pgMar w:top=\"{m}\" w:right=\"{m}\" w:bottom=\"{m}\" w:left=\"{m}\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>\n",
            m = MARGIN_TWIPS
        ));
        self.output.push_str("</w:sectPr>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut v = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        v.extend_from_slice(&13u32.to_be_bytes());
        v.extend_from_slice(b"IHDR");
        v.extend_from_slice(&w.to_be_bytes());
        v.extend_from_slice(&h.to_be_bytes());
        v
    }

    fn serialize(blocks: Vec<Block>) -> String {
        serialize_with(blocks, &ImageSet::new()).unwrap().xml
    }

    fn serialize_with(blocks: Vec<Block>, images: &ImageSet) -> Result<SerializedPart> {
        DocxSerializer::new().serialize(&ElementDocument { blocks }, images)
    }

    #[test]
    fn test_heading_levels_clamp() {
        let xml = serialize(vec![
            Block::Heading {
                level: 1,
                text: "One".to_string(),
            },
            Block::Heading {
                level: 5,
                text: "Five".to_string(),
            },
        ]);
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"<w:pStyle w:val="Heading3"/>"#));
        assert!(!xml.contains("Heading5"));
    }

    #[test]
    fn test_paragraph_runs_and_breaks() {
        let xml = serialize(vec![Block::Paragraph {
            runs: vec![
                Run::plain("a & b"),
                Run::bold("bold"),
                Run::italic("line1\nline2"),
            ],
        }]);
        assert!(xml.contains("a &amp; b"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("<w:i/>"));
        assert!(xml.contains("line1</w:t>\n<w:br/>\n<w:t xml:space=\"preserve\">line2"));
    }

    #[test]
    fn test_nested_lists_use_levels() {
        let xml = serialize(vec![Block::List {
            ordered: false,
            items: vec![
                Block::paragraph("outer"),
                Block::List {
                    ordered: true,
                    items: vec![Block::paragraph("inner")],
                },
            ],
        }]);
        assert!(xml.contains("<w:ilvl w:val=\"0\"/>\n<w:numId w:val=\"1\"/>"));
        assert!(xml.contains("<w:ilvl w:val=\"1\"/>\n<w:numId w:val=\"2\"/>"));
    }

    #[test]
    fn test_table_uniform_columns_and_header() {
        let rows = vec![
            vec![
                Cell::header(vec![Run::plain("A")]),
                Cell::header(vec![Run::plain("B")]),
                Cell::header(vec![Run::plain("C")]),
            ],
            vec![Cell::new(vec![Run::plain("1")])],
        ];
        let xml = serialize(vec![Block::Table {
            rows,
            header_row_count: 1,
        }]);

        assert_eq!(xml.matches("<w:gridCol w:w=\"3008\"/>").count(), 3);
        assert_eq!(xml.matches("<w:tc>").count(), 6);
        assert_eq!(xml.matches("<w:tcW w:w=\"1666\" w:type=\"pct\"/>").count(), 6);
        assert_eq!(xml.matches("w:fill=\"D9D9D9\"").count(), 3);
        assert_eq!(xml.matches("<w:tblHeader/>").count(), 1);
        assert!(xml.contains("<w:tblW w:w=\"5000\" w:type=\"pct\"/>"));
    }

    #[test]
    fn test_zero_column_table_is_malformed() {
        let err = serialize_with(
            vec![Block::Table {
                rows: vec![],
                header_row_count: 0,
            }],
            &ImageSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, OoxmlError::MalformedElement(_)));
    }

    #[test]
    fn test_raw_block_uses_code_style() {
        let xml = serialize(vec![Block::Raw {
            text: "fn main() {}\n<tag>".to_string(),
            language: Some("rust".to_string()),
        }]);
        assert!(xml.contains(r#"<w:pStyle w:val="Code"/>"#));
        assert!(xml.contains("&lt;tag&gt;"));
    }

    #[test]
    fn test_image_uses_placeholder_and_scaled_extent() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-wide", png(1200, 600));
        images.insert_with_id("img-small", png(100, 50));

        let part = serialize_with(
            vec![
                Block::Image {
                    id: "img-wide".to_string(),
                    alt: "Diagram 1".to_string(),
                },
                Block::Image {
                    id: "img-small".to_string(),
                    alt: "Diagram 2".to_string(),
                },
            ],
            &images,
        )
        .unwrap();

        assert!(part.xml.contains(r#"r:embed="mdoffice-image:img-wide""#));
        assert!(part.xml.contains(r#"<wp:extent cx="5731510" cy="2865755"/>"#));
        assert!(part.xml.contains(r#"<wp:extent cx="952500" cy="476250"/>"#));
        assert!(part.xml.contains(r#"<wp:docPr id="2" name="Picture 2" descr="Diagram 2"/>"#));
        assert_eq!(part.xml.matches(r#"<w:pStyle w:val="Caption"/>"#).count(), 2);
    }

    #[test]
    fn test_reserved_relationships_and_section() {
        let part = serialize_with(vec![Block::paragraph("x")], &ImageSet::new()).unwrap();
        assert_eq!(part.relationships.len(), 2);
        assert_eq!(part.relationships.next_id_number(), 3);
        assert!(part.xml.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
        assert!(part.xml.ends_with("</w:body>\n</w:document>"));
    }
}
