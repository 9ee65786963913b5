//! Block-level elements of the element document
//!
//! An [`ElementDocument`] is the format-neutral result of projecting
//! Markdown. Both the Word and the slide pipelines consume it.

use serde::{Deserialize, Serialize};

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A section heading with its plain text
    Heading { level: u8, text: String },
    /// A paragraph of styled runs
    Paragraph { runs: Vec<Run> },
    /// An ordered or unordered list
    ///
    /// Each item is usually a `Paragraph`; a nested `List` item belongs to
    /// the item preceding it.
    List { ordered: bool, items: Vec<Block> },
    /// A table; the first `header_row_count` rows are header rows
    Table {
        rows: Vec<Vec<Cell>>,
        header_row_count: usize,
    },
    /// A block quote, paragraphs separated by `\n`
    Quote { text: String },
    /// An image bound later through its placeholder id
    Image { id: String, alt: String },
    /// Verbatim text (code blocks, unrendered diagrams)
    Raw {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Block {
    /// Paragraph made of a single plain run
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            runs: vec![Run::plain(text)],
        }
    }

    /// Plain text of the block, runs concatenated
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { text, .. } | Block::Quote { text } | Block::Raw { text, .. } => {
                text.clone()
            }
            Block::Paragraph { runs } => runs_text(runs),
            Block::List { items, .. } => items
                .iter()
                .map(Block::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table { rows, .. } => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|c| runs_text(&c.runs))
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Image { alt, .. } => alt.clone(),
        }
    }

    /// Number of columns of a table block, taken from its first row
    pub fn column_count(&self) -> Option<usize> {
        match self {
            Block::Table { rows, .. } => Some(rows.first().map(Vec::len).unwrap_or(0)),
            _ => None,
        }
    }
}

fn runs_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Inline styled text fragment
///
/// A `'\n'` inside `text` is a hard line break.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    /// Inline code span, rendered monospace
    #[serde(default)]
    pub code: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
            ..Default::default()
        }
    }

    /// True when both runs carry the same styling
    pub fn same_style(&self, other: &Run) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.code == other.code
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub runs: Vec<Run>,
    /// Explicit header-cell marker
    #[serde(default)]
    pub header: bool,
}

impl Cell {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            header: false,
        }
    }

    pub fn header(runs: Vec<Run>) -> Self {
        Self { runs, header: true }
    }

    /// Empty cell used to pad short rows
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }
}

/// The element-level document model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementDocument {
    pub blocks: Vec<Block>,
}

impl ElementDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Placeholder ids of every image block, in document order
    ///
    /// Images nested inside lists are included.
    pub fn image_ids(&self) -> Vec<&str> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    Block::Image { id, .. } => out.push(id),
                    Block::List { items, .. } => walk(items, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let block = Block::Paragraph {
            runs: vec![Run::plain("Hello "), Run::bold("World")],
        };
        assert_eq!(block.plain_text(), "Hello World");
    }

    #[test]
    fn test_column_count() {
        let table = Block::Table {
            rows: vec![vec![Cell::header(vec![]), Cell::header(vec![])]],
            header_row_count: 1,
        };
        assert_eq!(table.column_count(), Some(2));

        let empty = Block::Table {
            rows: vec![],
            header_row_count: 0,
        };
        assert_eq!(empty.column_count(), Some(0));
        assert_eq!(Block::paragraph("x").column_count(), None);
    }

    #[test]
    fn test_image_ids_in_order() {
        let doc = ElementDocument {
            blocks: vec![
                Block::Image {
                    id: "a".into(),
                    alt: String::new(),
                },
                Block::List {
                    ordered: false,
                    items: vec![Block::Image {
                        id: "b".into(),
                        alt: String::new(),
                    }],
                },
            ],
        };
        assert_eq!(doc.image_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_block_serialization_is_tagged() {
        let json = serde_json::to_string(&Block::Quote {
            text: "q".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""kind":"quote""#));

        let raw: Block =
            serde_json::from_str(r#"{"kind":"raw","text":"fn main() {}"}"#).unwrap();
        assert_eq!(
            raw,
            Block::Raw {
                text: "fn main() {}".to_string(),
                language: None
            }
        );
    }
}
