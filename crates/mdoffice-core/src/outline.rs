//! Outline parser: Markdown to a flat sequence of slides
//!
//! A single forward pass over the lines with one open slide. Rules are
//! tried in order and the first match wins:
//!
//! 1. directive comments: `<!-- layout: NAME -->`, `<!-- subtitle: TEXT -->`,
//!    `<!-- column -->`
//! 2. fenced blocks (a diagram fence becomes the slide's diagram)
//! 3. `# ` starts a Title slide
//! 4. `## ` (and deeper) starts a Content slide
//! 5. `- ` / `* ` appends a bullet, indented bullets become third level
//! 6. `> ` emits a standalone Quote slide
//! 7. `![alt](url)` sets the slide image
//! 8. any other non-blank line appends a content line
//!
//! Lines that need an open slide are ignored when none is open. Layouts
//! not fixed by a directive are refined when the slide is flushed.

use std::sync::OnceLock;

use mdoffice_diagrams::{is_diagram_language, DiagramRenderer};
use mdoffice_model::{
    escape_literal, placeholder_id, ContentLine, ImageSet, Outline, SlideContent, SlideLayout,
};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Left,
    Right,
}

struct Fence {
    marker: String,
    info: String,
    lines: Vec<String>,
}

#[derive(Default)]
struct OutlineBuilder {
    slides: Vec<SlideContent>,
    current: Option<SlideContent>,
    /// Layout set by a directive, kept as-is on flush
    explicit_layout: bool,
    column: Option<Column>,
}

/// Parse a Markdown outline into slides
pub fn parse_outline(markdown: &str) -> Outline {
    let mut builder = OutlineBuilder::default();
    let mut fence: Option<Fence> = None;

    for raw in markdown.lines() {
        let line = raw.trim_end();

        if let Some(open) = fence.as_mut() {
            if closes_fence(line, &open.marker) {
                if let Some(done) = fence.take() {
                    builder.fenced_block(done);
                }
            } else {
                open.lines.push(line.to_string());
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if let Some(opened) = open_fence(line) {
            fence = Some(opened);
            continue;
        }

        builder.line(line);
    }

    // An unterminated fence runs to the end of the input
    if let Some(done) = fence {
        builder.fenced_block(done);
    }
    builder.flush();

    Outline {
        slides: builder.slides,
    }
}

impl OutlineBuilder {
    fn line(&mut self, line: &str) {
        let trimmed = line.trim_start();

        if let Some((name, value)) = directive(trimmed) {
            self.directive(&name, value.as_deref());
            return;
        }
        if trimmed.starts_with("<!--") && trimmed.ends_with("-->") {
            return;
        }

        if let Some((level, title)) = heading(trimmed) {
            self.flush();
            let layout = if level == 1 {
                SlideLayout::Title
            } else {
                SlideLayout::Content
            };
            self.current = Some(SlideContent::new(title, layout, level));
            return;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let indented = line.starts_with('\t') || line.len() - trimmed.len() >= 2;
            let item = item.trim();
            let encoded = if indented {
                ContentLine::Level3(item.to_string()).encode()
            } else {
                escape_literal(item)
            };
            self.append(encoded);
            return;
        }

        if let Some(quote) = quote_text(trimmed) {
            if self.column.is_some() && self.current.is_some() {
                self.append(ContentLine::Quote(quote.to_string()).encode());
            } else {
                self.flush();
                let mut slide = SlideContent::new(quote, SlideLayout::Quote, 0);
                split_attribution(&mut slide);
                self.slides.push(slide);
            }
            return;
        }

        if let Some((alt, url)) = image_reference(trimmed) {
            let in_columns = self.column.is_some();
            if let Some(slide) = self.current.as_mut() {
                if in_columns || slide.image_url.is_some() {
                    let encoded = ContentLine::Image { alt, url }.encode();
                    self.append(encoded);
                } else {
                    slide.image_url = Some(url);
                    slide.image_alt = Some(alt).filter(|a| !a.is_empty());
                }
            }
            return;
        }

        self.append(escape_literal(trimmed));
    }

    fn directive(&mut self, name: &str, value: Option<&str>) {
        let Some(slide) = self.current.as_mut() else {
            return;
        };
        match name {
            "layout" => match value.unwrap_or_default().parse::<SlideLayout>() {
                Ok(layout) => {
                    slide.layout = layout;
                    self.explicit_layout = true;
                    if layout == SlideLayout::TwoColumn && self.column.is_none() {
                        slide.left_column.append(&mut slide.content);
                        self.column = Some(Column::Left);
                    }
                }
                Err(e) => log::warn!("Ignoring layout directive: {}", e),
            },
            "subtitle" => {
                slide.subtitle = value.map(str::to_string).filter(|v| !v.is_empty());
            }
            "column" => match self.column {
                None => {
                    slide.left_column.append(&mut slide.content);
                    slide.layout = SlideLayout::TwoColumn;
                    self.column = Some(Column::Right);
                }
                Some(Column::Left) => self.column = Some(Column::Right),
                Some(Column::Right) => log::debug!("Extra column break ignored"),
            },
            other => log::debug!("Unknown directive '{}' ignored", other),
        }
    }

    fn fenced_block(&mut self, fence: Fence) {
        let Some(slide) = self.current.as_mut() else {
            return;
        };
        let code = fence.lines.join("\n");

        if is_diagram_language(&fence.info) && slide.diagram.is_none() {
            slide.diagram = Some(code);
            return;
        }

        for line in fence.lines.iter().filter(|l| !l.trim().is_empty()) {
            self.append(escape_literal(line.trim_end()));
        }
    }

    /// Add a content line to the open slide, in the active column
    fn append(&mut self, line: String) {
        let Some(slide) = self.current.as_mut() else {
            return;
        };
        match self.column {
            None => slide.content.push(line),
            Some(Column::Left) => slide.left_column.push(line),
            Some(Column::Right) => slide.right_column.push(line),
        }
    }

    fn flush(&mut self) {
        if let Some(mut slide) = self.current.take() {
            if !self.explicit_layout {
                infer_layout(&mut slide);
            }
            self.slides.push(slide);
        }
        self.explicit_layout = false;
        self.column = None;
    }
}

/// Refine the layout of a slide whose layout was not set explicitly
fn infer_layout(slide: &mut SlideContent) {
    if matches!(slide.layout, SlideLayout::Title | SlideLayout::Content)
        && is_closing_title(&slide.title)
    {
        slide.layout = SlideLayout::ThankYou;
        return;
    }

    if slide.layout == SlideLayout::Content && slide.has_no_body() {
        slide.layout = if slide.has_picture() {
            SlideLayout::Image
        } else {
            SlideLayout::Subsection
        };
    }
}

fn is_closing_title(title: &str) -> bool {
    static CLOSING_RE: OnceLock<Regex> = OnceLock::new();
    let re = CLOSING_RE.get_or_init(|| {
        Regex::new(r"(?i)^\W*(thank\s*you|thanks|questions|q\s*&\s*a)\b").unwrap()
    });
    re.is_match(title.trim())
}

/// Move a trailing `— Author` or `-- Author` into the subtitle
fn split_attribution(slide: &mut SlideContent) {
    static ATTRIBUTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = ATTRIBUTION_RE
        .get_or_init(|| Regex::new(r"^(?P<quote>.*?)\s*(?:\u{2014}|--)\s*(?P<who>[^\u{2014}]+)$").unwrap());

    let parsed = re.captures(&slide.title).map(|caps| {
        (
            caps["quote"].trim().to_string(),
            caps["who"].trim().to_string(),
        )
    });
    if let Some((quote, who)) = parsed {
        if !who.is_empty() {
            slide.title = quote;
            slide.subtitle = Some(who);
        }
    }
}

/// `# Title` as (level, text); `#hashtag` is not a heading
fn heading(line: &str) -> Option<(u8, String)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    Some((hashes as u8, title.to_string()))
}

fn directive(line: &str) -> Option<(String, Option<String>)> {
    static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DIRECTIVE_RE.get_or_init(|| {
        Regex::new(r"^<!--\s*(?P<name>[A-Za-z][\w-]*)\s*(?::\s*(?P<value>.*?))?\s*-->$").unwrap()
    });
    let caps = re.captures(line)?;
    let name = caps["name"].to_ascii_lowercase();
    let value = caps.name("value").map(|m| m.as_str().trim().to_string());
    Some((name, value))
}

fn image_reference(line: &str) -> Option<(String, String)> {
    static IMAGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = IMAGE_RE.get_or_init(|| {
        Regex::new(r#"^!\[(?P<alt>[^\]]*)\]\((?P<url>[^)\s]+)(?:\s+"[^"]*")?\)$"#).unwrap()
    });
    let caps = re.captures(line)?;
    Some((caps["alt"].trim().to_string(), caps["url"].to_string()))
}

/// Text of a `> ` line, or of a bare `>`; `>text` is not a quote
fn quote_text(line: &str) -> Option<&str> {
    if line == ">" {
        return Some("");
    }
    line.strip_prefix("> ").map(str::trim)
}

fn open_fence(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    let marker: String = std::iter::repeat(ch).take(len).collect();
    Some(Fence {
        info: trimmed[len..].trim().to_string(),
        marker,
        lines: Vec::new(),
    })
}

/// A closing fence repeats the opening character at least as often, alone on its line
fn closes_fence(line: &str, marker: &str) -> bool {
    let Some(ch) = marker.chars().next() else {
        return false;
    };
    let trimmed = line.trim();
    trimmed.chars().all(|c| c == ch) && trimmed.chars().count() >= marker.chars().count()
}

/// Render the diagrams of an outline
///
/// Each slide diagram is rendered once. On success the slide gets an
/// `image_ref` into the returned set; on failure the source lines become
/// ordinary content and an Image layout falls back to Content.
pub fn render_outline_diagrams(outline: &mut Outline, renderer: &dyn DiagramRenderer) -> ImageSet {
    let mut images = ImageSet::new();

    for (index, slide) in outline.slides.iter_mut().enumerate() {
        let Some(code) = slide.diagram.take() else {
            continue;
        };
        match renderer.render(&code) {
            Ok(bytes) => {
                let id = placeholder_id();
                images.insert_with_id(id.clone(), bytes);
                slide.image_ref = Some(id);
            }
            Err(e) => {
                log::warn!("Diagram on slide {} left unrendered: {}", index + 1, e);
                let lines = code
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| escape_literal(l.trim_end()));
                match (slide.layout, slide.left_column.is_empty()) {
                    (SlideLayout::TwoColumn, false) => slide.right_column.extend(lines),
                    _ => slide.content.extend(lines),
                }
                if slide.layout == SlideLayout::Image && slide.image_url.is_none() {
                    slide.layout = SlideLayout::Content;
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_title() {
        let outline = parse_outline("# Title");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.slides[0].layout, SlideLayout::Title);
        assert_eq!(outline.slides[0].title, "Title");
        assert!(outline.slides[0].content.is_empty());
    }

    #[test]
    fn test_title_then_content() {
        let outline = parse_outline("# A\n## B\n- x\n- y");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.slides[1].layout, SlideLayout::Content);
        assert_eq!(outline.slides[1].content, vec!["x", "y"]);
        assert_eq!(outline.slides[1].level, 2);
    }

    #[test]
    fn test_single_quote_line() {
        let outline = parse_outline("> quote");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.slides[0].layout, SlideLayout::Quote);
        assert_eq!(outline.slides[0].title, "quote");
    }

    #[test]
    fn test_quote_closes_open_slide() {
        let outline = parse_outline("## Before\n- a\n> Said\n- dropped");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.slides[0].content, vec!["a"]);
        assert_eq!(outline.slides[1].layout, SlideLayout::Quote);
    }

    #[test]
    fn test_quote_attribution() {
        let outline = parse_outline("> Simple is better than complex. -- Tim");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.slides[0].title, "Simple is better than complex.");
        assert_eq!(outline.slides[0].subtitle.as_deref(), Some("Tim"));
    }

    #[test]
    fn test_each_quote_line_is_its_own_slide() {
        let outline = parse_outline("> first\n> second");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.slides[0].title, "first");
        assert_eq!(outline.slides[1].title, "second");
        assert!(outline
            .slides
            .iter()
            .all(|s| s.layout == SlideLayout::Quote && s.subtitle.is_none()));
    }

    #[test]
    fn test_quote_marker_needs_a_space() {
        let outline = parse_outline("## S\n>not a quote\n>");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.slides[0].content, vec![">not a quote"]);
        assert_eq!(outline.slides[1].layout, SlideLayout::Quote);
        assert_eq!(outline.slides[1].title, "");
    }

    #[test]
    fn test_bullets_without_slide_are_ignored() {
        let outline = parse_outline("- orphan\n# T");
        assert_eq!(outline.len(), 1);
        assert!(outline.slides[0].content.is_empty());
    }

    #[test]
    fn test_indented_bullet_is_level3() {
        let outline = parse_outline("## S\n- top\n  - deep");
        assert_eq!(outline.slides[0].content, vec!["top", "L3:deep"]);
    }

    #[test]
    fn test_literal_marker_text_is_escaped() {
        let outline = parse_outline("## S\nL3: is just text");
        assert_eq!(outline.slides[0].content, vec!["\\L3: is just text"]);
    }

    #[test]
    fn test_image_line_sets_url() {
        let outline = parse_outline("## Chart\n![Sales](img/sales.png)\n- note");
        let slide = &outline.slides[0];
        assert_eq!(slide.image_url.as_deref(), Some("img/sales.png"));
        assert_eq!(slide.image_alt.as_deref(), Some("Sales"));
        assert_eq!(slide.layout, SlideLayout::Content);
    }

    #[test]
    fn test_image_only_slide_is_image_layout() {
        let outline = parse_outline("## Chart\n![Sales](sales.png)");
        assert_eq!(outline.slides[0].layout, SlideLayout::Image);
    }

    #[test]
    fn test_empty_content_slide_is_subsection() {
        let outline = parse_outline("## Part Two\n### Details\n- point");
        assert_eq!(outline.slides[0].layout, SlideLayout::Subsection);
        assert_eq!(outline.slides[1].layout, SlideLayout::Content);
        assert_eq!(outline.slides[1].level, 3);
    }

    #[test]
    fn test_thank_you_inferred() {
        let outline = parse_outline("## Thank you!\n- contact@example.com");
        assert_eq!(outline.slides[0].layout, SlideLayout::ThankYou);
        let outline = parse_outline("# Questions?");
        assert_eq!(outline.slides[0].layout, SlideLayout::ThankYou);
    }

    #[test]
    fn test_column_break_makes_two_columns() {
        let md = "## Compare\n- left a\n<!-- column -->\n- right a\n> wise words\n![Logo](logo.png)";
        let outline = parse_outline(md);
        assert_eq!(outline.len(), 1);
        let slide = &outline.slides[0];
        assert_eq!(slide.layout, SlideLayout::TwoColumn);
        assert_eq!(slide.left_column, vec!["left a"]);
        assert_eq!(
            slide.right_column,
            vec!["right a", "Q:wise words", "IMG:Logo|logo.png"]
        );
        assert!(slide.content.is_empty());
    }

    #[test]
    fn test_explicit_layout_directive() {
        let md = "## Agenda\n<!-- layout: two-column -->\n- a\n<!-- column -->\n- b";
        let slide = &parse_outline(md).slides[0];
        assert_eq!(slide.layout, SlideLayout::TwoColumn);
        assert_eq!(slide.left_column, vec!["a"]);
        assert_eq!(slide.right_column, vec!["b"]);
    }

    #[test]
    fn test_explicit_layout_is_not_refined() {
        let md = "## Thanks\n<!-- layout: content -->";
        assert_eq!(parse_outline(md).slides[0].layout, SlideLayout::Content);
    }

    #[test]
    fn test_plain_comments_are_skipped() {
        let outline = parse_outline("## S\n<!-- speaker: slow down here -->\n- a");
        assert_eq!(outline.slides[0].content, vec!["a"]);
    }

    #[test]
    fn test_subtitle_directive() {
        let md = "# Deck\n<!-- subtitle: Q3 review -->";
        assert_eq!(
            parse_outline(md).slides[0].subtitle.as_deref(),
            Some("Q3 review")
        );
    }

    #[test]
    fn test_diagram_fence_attaches_to_slide() {
        let md = "## Flow\n```mermaid\ngraph TD\n  A-->B\n```";
        let slide = &parse_outline(md).slides[0];
        assert_eq!(slide.diagram.as_deref(), Some("graph TD\n  A-->B"));
        assert_eq!(slide.layout, SlideLayout::Image);
    }

    #[test]
    fn test_code_fence_lines_become_content() {
        let md = "## Code\n```rust\n# not a heading\nfn main() {}\n```";
        let outline = parse_outline(md);
        assert_eq!(outline.len(), 1);
        assert_eq!(
            outline.slides[0].content,
            vec!["# not a heading", "fn main() {}"]
        );
    }

    #[test]
    fn test_fence_closes_only_on_a_bare_marker() {
        let md = "## Code\n```text\n```not a close\nstill code\n````\n- after";
        let outline = parse_outline(md);
        assert_eq!(
            outline.slides[0].content,
            vec!["```not a close", "still code", "after"]
        );
    }

    #[test]
    fn test_hashtag_is_not_heading() {
        let outline = parse_outline("## S\n#hashtag");
        assert_eq!(outline.slides[0].content, vec!["#hashtag"]);
    }

    #[test]
    fn test_render_outline_diagrams_failure_falls_back() {
        struct Down;
        impl DiagramRenderer for Down {
            fn name(&self) -> &'static str {
                "down"
            }
            fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
                Err(mdoffice_diagrams::RenderError::Disabled)
            }
        }

        let mut outline = parse_outline("## Flow\n```mermaid\ngraph TD\nA-->B\n```");
        let images = render_outline_diagrams(&mut outline, &Down);
        assert!(images.is_empty());
        let slide = &outline.slides[0];
        assert_eq!(slide.layout, SlideLayout::Content);
        assert_eq!(slide.content, vec!["graph TD", "A-->B"]);
        assert!(slide.diagram.is_none());
    }

    #[test]
    fn test_render_outline_diagrams_success() {
        struct Up;
        impl DiagramRenderer for Up {
            fn name(&self) -> &'static str {
                "up"
            }
            fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
                Ok(vec![0x89, b'P', b'N', b'G'])
            }
        }

        let mut outline = parse_outline("## Flow\n```mermaid\ngraph TD\n```");
        let images = render_outline_diagrams(&mut outline, &Up);
        let id = outline.slides[0].image_ref.clone().unwrap();
        assert!(images.contains(&id));
    }
}
