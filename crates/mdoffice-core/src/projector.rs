//! Markup projector: Markdown to element document
//!
//! Walks the event stream of the structural parser and builds an
//! [`ElementDocument`]. Every container start pushes a frame and every end
//! event pops exactly one, so nesting is resolved structurally: a list
//! never swallows a table, a quote never splits emphasis.
//!
//! Fenced diagram blocks are rendered through a [`DiagramRenderer`]. A
//! failed render keeps the block as raw text and the conversion goes on.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mdoffice_diagrams::{is_diagram_language, DiagramRenderer};
use mdoffice_model::{
    placeholder_id, Block, Cell, ElementDocument, ImageFormat, ImageSet, Run,
};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;

use crate::html;
use crate::inline::parse_runs;
use crate::pipe_table::{is_separator_row, split_pipe_table};

/// Result of projecting one Markdown document
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub document: ElementDocument,
    /// Exactly the images referenced by `document`
    pub images: ImageSet,
}

/// Parser options used for projection
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Projects Markdown into the element model
#[derive(Clone, Copy, Default)]
pub struct Projector<'r> {
    renderer: Option<&'r dyn DiagramRenderer>,
}

impl<'r> Projector<'r> {
    /// Projector that leaves diagram blocks as raw text
    pub fn new() -> Self {
        Self { renderer: None }
    }

    /// Projector that renders diagram blocks with `renderer`
    pub fn with_renderer(renderer: &'r dyn DiagramRenderer) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    /// Project a Markdown document
    pub fn project(&self, markdown: &str) -> Projection {
        let mut walk = Walk {
            source: markdown,
            renderer: self.renderer,
            stack: Vec::new(),
            document: ElementDocument::new(),
            staged: HashMap::new(),
            bold: 0,
            italic: 0,
            diagrams: 0,
        };

        for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
            walk.event(event, range);
        }
        walk.finish()
    }
}

/// Project with an optional renderer
pub fn project(markdown: &str, renderer: Option<&dyn DiagramRenderer>) -> Projection {
    match renderer {
        Some(r) => Projector::with_renderer(r).project(markdown),
        None => Projector::new().project(markdown),
    }
}

enum Frame {
    Paragraph {
        runs: Vec<Run>,
        images: Vec<Block>,
        range: Range<usize>,
    },
    Heading {
        level: u8,
        runs: Vec<Run>,
    },
    Quote {
        blocks: Vec<Block>,
    },
    List {
        ordered: bool,
        items: Vec<Block>,
    },
    Item {
        blocks: Vec<Block>,
        runs: Vec<Run>,
    },
    Table {
        rows: Vec<Vec<Cell>>,
    },
    Row {
        cells: Vec<Cell>,
        header: bool,
    },
    Cell {
        runs: Vec<Run>,
        header: bool,
    },
    Code {
        info: Option<String>,
        text: String,
    },
    Html {
        text: String,
    },
    Image {
        dest: String,
        alt: String,
    },
    Strong,
    Emphasis,
    Other,
}

struct Walk<'a, 'r> {
    source: &'a str,
    renderer: Option<&'r dyn DiagramRenderer>,
    stack: Vec<Frame>,
    document: ElementDocument,
    /// Image bytes by placeholder id, bound at the end to referenced ids only
    staged: HashMap<String, Vec<u8>>,
    bold: usize,
    italic: usize,
    diagrams: usize,
}

impl Walk<'_, '_> {
    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let run = Run {
                    text: code.to_string(),
                    bold: self.bold > 0,
                    italic: self.italic > 0,
                    code: true,
                };
                self.push_run(run);
            }
            Event::Html(fragment) => self.html(&fragment),
            Event::InlineHtml(fragment) => {
                if html::is_line_break(&fragment) {
                    self.text("\n");
                } else {
                    let text = html::to_text(&fragment);
                    if !text.is_empty() {
                        self.text(&text);
                    }
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.text("\n"),
            Event::TaskListMarker(checked) => {
                self.push_run(Run::plain(if checked { "\u{2611} " } else { "\u{2610} " }))
            }
            Event::FootnoteReference(label) => self.text(&format!("[^{}]", label)),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph {
                runs: Vec::new(),
                images: Vec::new(),
                range,
            },
            Tag::Heading { level, .. } => Frame::Heading {
                level: level as u8,
                runs: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Quote { blocks: Vec::new() },
            Tag::List(start) => {
                self.flush_item_runs();
                Frame::List {
                    ordered: start.is_some(),
                    items: Vec::new(),
                }
            }
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                runs: Vec::new(),
            },
            Tag::Table(_) => Frame::Table { rows: Vec::new() },
            Tag::TableHead => Frame::Row {
                cells: Vec::new(),
                header: true,
            },
            Tag::TableRow => Frame::Row {
                cells: Vec::new(),
                header: false,
            },
            Tag::TableCell => {
                let header = matches!(self.stack.last(), Some(Frame::Row { header: true, .. }));
                Frame::Cell {
                    runs: Vec::new(),
                    header,
                }
            }
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => {
                        Some(info.trim().to_string()).filter(|i| !i.is_empty())
                    }
                    CodeBlockKind::Indented => None,
                };
                Frame::Code {
                    info,
                    text: String::new(),
                }
            }
            Tag::HtmlBlock => Frame::Html {
                text: String::new(),
            },
            Tag::Image { dest_url, .. } => Frame::Image {
                dest: dest_url.to_string(),
                alt: String::new(),
            },
            Tag::Strong => {
                self.bold += 1;
                Frame::Strong
            }
            Tag::Emphasis => {
                self.italic += 1;
                Frame::Emphasis
            }
            _ => Frame::Other,
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Paragraph {
                runs,
                images,
                range,
            } => self.end_paragraph(runs, images, range),
            Frame::Heading { level, runs } => {
                let text = runs_text(&runs).trim().to_string();
                self.emit(Block::Heading { level, text });
            }
            Frame::Quote { blocks } => {
                let text = blocks
                    .iter()
                    .map(Block::plain_text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.emit(Block::Quote { text });
            }
            Frame::List { ordered, items } => self.emit(Block::List { ordered, items }),
            Frame::Item { mut blocks, runs } => {
                if let Some(paragraph) = paragraph_from_runs(runs) {
                    blocks.push(paragraph);
                }
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.extend(blocks);
                }
            }
            Frame::Table { rows } => self.emit(normalize_table(rows)),
            Frame::Row { cells, header } => {
                if let Some(Frame::Table { rows }) = self.stack.last_mut() {
                    let cells = cells
                        .into_iter()
                        .map(|c| Cell {
                            header: c.header || header,
                            ..c
                        })
                        .collect();
                    rows.push(cells);
                }
            }
            Frame::Cell { runs, header } => {
                if let Some(Frame::Row { cells, .. }) = self.stack.last_mut() {
                    cells.push(Cell {
                        runs: trim_runs(runs),
                        header,
                    });
                }
            }
            Frame::Code { info, text } => self.end_code(info, text),
            Frame::Html { text } => {
                let text = html::to_text(&text);
                if !text.is_empty() {
                    self.emit(Block::paragraph(text));
                }
            }
            Frame::Image { dest, alt } => self.end_image(dest, alt),
            Frame::Strong => self.bold = self.bold.saturating_sub(1),
            Frame::Emphasis => self.italic = self.italic.saturating_sub(1),
            Frame::Other => {}
        }
    }

    fn end_paragraph(&mut self, runs: Vec<Run>, images: Vec<Block>, range: Range<usize>) {
        if !self.in_quote() && !self.in_list() && runs.iter().any(|r| r.text.contains('|')) {
            if let Some(blocks) = self.pipe_table_fallback(range) {
                for block in blocks.into_iter().chain(images) {
                    self.emit(block);
                }
                return;
            }
        }

        if let Some(paragraph) = paragraph_from_runs(runs) {
            self.emit(paragraph);
        }
        for image in images {
            self.emit(image);
        }
    }

    fn pipe_table_fallback(&self, range: Range<usize>) -> Option<Vec<Block>> {
        let source = self.source.get(range)?;
        let lines: Vec<&str> = source.lines().collect();
        if !lines.iter().any(|l| is_separator_row(l)) {
            return None;
        }
        let split = split_pipe_table(&lines)?;
        log::debug!("Recovered pipe table from paragraph text");

        let mut blocks = Vec::new();
        if let Some(p) = paragraph_from_lines(&split.before) {
            blocks.push(p);
        }
        blocks.push(split.table);
        if let Some(p) = paragraph_from_lines(&split.after) {
            blocks.push(p);
        }
        Some(blocks)
    }

    fn end_code(&mut self, info: Option<String>, text: String) {
        let code = text.trim_end_matches('\n').to_string();
        let diagram = info.as_deref().is_some_and(is_diagram_language);

        if diagram && !self.in_quote() {
            if let Some(renderer) = self.renderer {
                match renderer.render(&code) {
                    Ok(bytes) => {
                        self.diagrams += 1;
                        let id = placeholder_id();
                        log::debug!("Rendered diagram {} ({} bytes)", self.diagrams, bytes.len());
                        self.staged.insert(id.clone(), bytes);
                        self.emit(Block::Image {
                            id,
                            alt: format!("Diagram {}", self.diagrams),
                        });
                        return;
                    }
                    Err(e) => {
                        log::warn!("Diagram left unrendered: {}", e);
                    }
                }
            }
        }

        self.emit(Block::Raw {
            text: code,
            language: info,
        });
    }

    fn end_image(&mut self, dest: String, alt: String) {
        if !self.in_quote() {
            if let Some(bytes) = decode_data_uri(&dest) {
                if let Some(Frame::Paragraph { images, .. }) = self.stack.last_mut() {
                    let id = placeholder_id();
                    self.staged.insert(id.clone(), bytes);
                    images.push(Block::Image { id, alt });
                    return;
                }
            }
        }

        let text = if alt.is_empty() { dest } else { alt };
        self.push_run(Run {
            text,
            italic: true,
            ..Default::default()
        });
    }

    fn html(&mut self, fragment: &str) {
        match self.stack.last_mut() {
            Some(Frame::Html { text }) => text.push_str(fragment),
            _ => {
                let text = html::to_text(fragment);
                if !text.is_empty() {
                    self.text(&text);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Image { alt, .. } => {
                    alt.push_str(text);
                    return;
                }
                Frame::Code { text: buf, .. } | Frame::Html { text: buf } => {
                    buf.push_str(text);
                    return;
                }
                Frame::Paragraph { .. }
                | Frame::Heading { .. }
                | Frame::Item { .. }
                | Frame::Cell { .. } => break,
                _ => {}
            }
        }

        let run = Run {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: false,
        };
        self.push_run(run);
    }

    fn push_run(&mut self, run: Run) {
        for frame in self.stack.iter_mut().rev() {
            let runs = match frame {
                Frame::Paragraph { runs, .. }
                | Frame::Heading { runs, .. }
                | Frame::Item { runs, .. }
                | Frame::Cell { runs, .. } => runs,
                Frame::Image { alt, .. } => {
                    alt.push_str(&run.text);
                    return;
                }
                _ => continue,
            };
            append_run(runs, run);
            return;
        }
    }

    /// Hand a finished block to the innermost container
    fn emit(&mut self, block: Block) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Quote { blocks } => {
                    blocks.push(block);
                    return;
                }
                Frame::Item { blocks, runs } => {
                    if let Some(p) = paragraph_from_runs(std::mem::take(runs)) {
                        blocks.push(p);
                    }
                    blocks.push(block);
                    return;
                }
                Frame::List { items, .. } => {
                    items.push(block);
                    return;
                }
                _ => {}
            }
        }
        self.document.push(block);
    }

    /// Tight list items carry text directly; close it before a nested block
    fn flush_item_runs(&mut self) {
        if let Some(Frame::Item { blocks, runs }) = self.stack.last_mut() {
            if let Some(p) = paragraph_from_runs(std::mem::take(runs)) {
                blocks.push(p);
            }
        }
    }

    fn in_quote(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::Quote { .. }))
    }

    fn in_list(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f, Frame::List { .. } | Frame::Item { .. }))
    }

    fn finish(mut self) -> Projection {
        while !self.stack.is_empty() {
            self.end();
        }

        let mut images = ImageSet::new();
        for id in self.document.image_ids() {
            if let Some(bytes) = self.staged.remove(id) {
                images.insert_with_id(id, bytes);
            }
        }
        if !self.staged.is_empty() {
            log::debug!("Discarded {} unreferenced images", self.staged.len());
        }

        Projection {
            document: self.document,
            images,
        }
    }
}

fn append_run(runs: &mut Vec<Run>, run: Run) {
    if run.text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.same_style(&run) => last.text.push_str(&run.text),
        _ => runs.push(run),
    }
}

fn runs_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Strip outer whitespace from a run sequence, dropping emptied runs
fn trim_runs(mut runs: Vec<Run>) -> Vec<Run> {
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start_matches(&[' ', '\t'][..]).to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    runs.retain(|r| !r.text.is_empty());
    runs
}

fn paragraph_from_runs(runs: Vec<Run>) -> Option<Block> {
    let runs = trim_runs(runs);
    if runs.iter().all(|r| r.text.trim().is_empty()) {
        return None;
    }
    Some(Block::Paragraph { runs })
}

fn paragraph_from_lines(lines: &[String]) -> Option<Block> {
    let lines: Vec<String> = lines.iter().map(|l| without_embedded_images(l)).collect();
    let text = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }
    Some(Block::Paragraph {
        runs: parse_runs(&text),
    })
}

/// Drop `![alt](data:...)` markup that already became an image block
fn without_embedded_images(line: &str) -> String {
    static DATA_IMAGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATA_IMAGE_RE.get_or_init(|| Regex::new(r"!\[[^\]]*\]\((?P<uri>data:[^)\s]+)\)").unwrap());
    re.replace_all(line, |caps: &regex::Captures| {
        if decode_data_uri(&caps["uri"]).is_some() {
            String::new()
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Pad or truncate rows to the header width and count header rows
fn normalize_table(mut rows: Vec<Vec<Cell>>) -> Block {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    for row in rows.iter_mut().skip(1) {
        row.resize_with(width, Cell::empty);
    }

    let leading_headers = rows
        .iter()
        .take_while(|row| !row.is_empty() && row.iter().all(|c| c.header))
        .count();
    let header_row_count = if rows.is_empty() {
        0
    } else {
        leading_headers.max(1)
    };

    Block::Table {
        rows,
        header_row_count,
    }
}

/// Decode a `data:image/<type>;base64,<payload>` URI
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let media = meta.strip_suffix(";base64")?;
    let subtype = media.strip_prefix("image/")?;
    ImageFormat::from_mime_subtype(subtype)?;

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok().filter(|b| !b.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdoffice_diagrams::RenderError;

    struct FixedRenderer(Vec<u8>);

    impl DiagramRenderer for FixedRenderer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRenderer;

    impl DiagramRenderer for FailingRenderer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
            Err(RenderError::Status {
                endpoint: "test".to_string(),
                status: 500,
            })
        }
    }

    fn blocks(md: &str) -> Vec<Block> {
        Projector::new().project(md).document.blocks
    }

    #[test]
    fn test_heading_and_paragraph() {
        let b = blocks("# Title\n\nHello **world**.");
        assert_eq!(
            b[0],
            Block::Heading {
                level: 1,
                text: "Title".into()
            }
        );
        assert_eq!(
            b[1],
            Block::Paragraph {
                runs: vec![Run::plain("Hello "), Run::bold("world"), Run::plain(".")]
            }
        );
    }

    #[test]
    fn test_nested_emphasis() {
        let b = blocks("***x*** and _y_");
        match &b[0] {
            Block::Paragraph { runs } => {
                assert!(runs[0].bold && runs[0].italic);
                assert_eq!(runs[2], Run::italic("y"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tight_nested_list() {
        let b = blocks("- a\n  - b\n- c");
        match &b[0] {
            Block::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(items.len(), 3);
                assert_eq!(items[0].plain_text(), "a");
                assert!(matches!(items[1], Block::List { .. }));
                assert_eq!(items[2].plain_text(), "c");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ordered_list() {
        let b = blocks("1. one\n2. two");
        assert!(matches!(&b[0], Block::List { ordered: true, items } if items.len() == 2));
    }

    #[test]
    fn test_task_list_markers() {
        let b = blocks("- [x] done\n- [ ] open");
        match &b[0] {
            Block::List { items, .. } => {
                assert_eq!(items[0].plain_text(), "\u{2611} done");
                assert_eq!(items[1].plain_text(), "\u{2610} open");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_native_table_header_and_padding() {
        let b = blocks("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 |");
        match &b[0] {
            Block::Table {
                rows,
                header_row_count,
            } => {
                assert_eq!(*header_row_count, 1);
                assert!(rows[0].iter().all(|c| c.header));
                assert_eq!(rows[0][0].text(), "A");
                assert!(rows.iter().all(|r| r.len() == 2));
                assert_eq!(rows[2][1].text(), "");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pipe_table_fallback_after_text() {
        // Header and separator widths differ, so this is not a native table
        let b = blocks("Intro\n| A | B |\n|---|\n| 1 | 2 |");
        assert!(b.iter().any(|blk| matches!(blk, Block::Table { .. })));
        assert_eq!(b[0].plain_text(), "Intro");
    }

    #[test]
    fn test_pipe_text_in_loose_list_item_stays_text() {
        let b = blocks("- item\n\n  | A | B |\n  |---|\n  | 1 | 2 |");
        assert_eq!(b.len(), 1);
        match &b[0] {
            Block::List { items, .. } => {
                assert!(!items.iter().any(|i| matches!(i, Block::Table { .. })));
                assert!(items.iter().any(|i| i.plain_text().contains("| A | B |")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pipe_text_in_heading_stays_text() {
        let b = blocks("## A | B\n|---|");
        assert_eq!(
            b[0],
            Block::Heading {
                level: 2,
                text: "A | B".into()
            }
        );
        assert!(!b.iter().any(|blk| matches!(blk, Block::Table { .. })));
    }

    #[test]
    fn test_pipe_table_fallback_keeps_embedded_images() {
        let md = "Intro ![dot](data:image/png;base64,iVBORw0KGgo=)\n| A | B |\n|---|\n| 1 | 2 |";
        let p = Projector::new().project(md);
        let b = &p.document.blocks;

        assert_eq!(b.len(), 3);
        assert_eq!(b[0].plain_text(), "Intro");
        assert!(matches!(b[1], Block::Table { .. }));
        assert!(matches!(&b[2], Block::Image { alt, .. } if alt == "dot"));
        assert_eq!(p.images.len(), 1);
    }

    #[test]
    fn test_pipes_without_separator_stay_text() {
        let b = blocks("a | b | c");
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].plain_text(), "a | b | c");
    }

    #[test]
    fn test_block_quote_text() {
        let b = blocks("> first\n>\n> second");
        assert_eq!(
            b[0],
            Block::Quote {
                text: "first\nsecond".into()
            }
        );
    }

    #[test]
    fn test_code_block_is_not_unescaped() {
        let b = blocks("```html\n&lt;b&gt;\n```");
        assert_eq!(
            b[0],
            Block::Raw {
                text: "&lt;b&gt;".into(),
                language: Some("html".into())
            }
        );
    }

    #[test]
    fn test_inline_html_unescaped_once() {
        let b = blocks("a<br>b <span>&amp;lt;</span>");
        let text = b[0].plain_text();
        assert!(text.starts_with("a\nb"));
        assert!(!text.contains("<span>"));
    }

    #[test]
    fn test_html_comment_block_dropped() {
        let b = blocks("<!-- hidden -->\n\ntext");
        assert_eq!(b, vec![Block::paragraph("text")]);
    }

    #[test]
    fn test_diagram_rendered_to_image() {
        let renderer = FixedRenderer(b"\x89PNG....".to_vec());
        let p = Projector::with_renderer(&renderer).project("```mermaid\ngraph TD; A-->B\n```");
        match &p.document.blocks[0] {
            Block::Image { id, alt } => {
                assert_eq!(alt, "Diagram 1");
                assert!(p.images.contains(id));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(p.images.len(), 1);
    }

    #[test]
    fn test_failed_diagram_kept_as_raw() {
        let p = Projector::with_renderer(&FailingRenderer)
            .project("```mermaid\ngraph TD; A-->B\n```\n\nStill here.");
        assert_eq!(
            p.document.blocks[0],
            Block::Raw {
                text: "graph TD; A-->B".into(),
                language: Some("mermaid".into())
            }
        );
        assert_eq!(p.document.blocks[1].plain_text(), "Still here.");
        assert!(p.images.is_empty());
    }

    #[test]
    fn test_diagram_inside_quote_is_not_rendered() {
        let renderer = FixedRenderer(b"\x89PNG".to_vec());
        let p = Projector::with_renderer(&renderer).project("> ```mermaid\n> graph TD\n> ```");
        assert!(p.images.is_empty());
        assert!(matches!(p.document.blocks[0], Block::Quote { .. }));
    }

    #[test]
    fn test_data_uri_image_becomes_asset() {
        let p = Projector::new().project("![dot](data:image/png;base64,iVBORw0KGgo=)");
        assert_eq!(p.images.len(), 1);
        assert!(matches!(&p.document.blocks[0], Block::Image { alt, .. } if alt == "dot"));
    }

    #[test]
    fn test_remote_image_becomes_alt_text() {
        let b = blocks("See ![chart](https://example.com/c.png)");
        match &b[0] {
            Block::Paragraph { runs } => assert_eq!(runs[1], Run::italic("chart")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_data_uri() {
        assert!(decode_data_uri("data:image/png;base64,AAEC").is_some());
        assert!(decode_data_uri("data:text/plain;base64,AAEC").is_none());
        assert!(decode_data_uri("data:image/png,raw").is_none());
        assert!(decode_data_uri("https://x/y.png").is_none());
    }
}
