//! End-to-end conversions through the engine with stub diagram renderers

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;

use mdoffice::{
    CancelToken, DeckOptions, DeckStyle, DiagramRenderer, Engine, EngineConfig, EngineError, TemplateSelector,
};
use mdoffice_diagrams::RenderError;
use mdoffice_ooxml::Relationships;
use zip::ZipArchive;

/// Renders every diagram as a small PNG
struct PngRenderer;

impl DiagramRenderer for PngRenderer {
    fn name(&self) -> &'static str {
        "png-stub"
    }

    fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
        let mut v = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        v.extend_from_slice(&13u32.to_be_bytes());
        v.extend_from_slice(b"IHDR");
        v.extend_from_slice(&640u32.to_be_bytes());
        v.extend_from_slice(&480u32.to_be_bytes());
        Ok(v)
    }
}

/// Fails every diagram the way an unreachable service would
struct DownRenderer;

impl DiagramRenderer for DownRenderer {
    fn name(&self) -> &'static str {
        "down"
    }

    fn render(&self, _code: &str) -> mdoffice_diagrams::Result<Vec<u8>> {
        Err(RenderError::Status {
            endpoint: "http://127.0.0.1:9/render".to_string(),
            status: 503,
        })
    }
}

const REPORT: &str = "\
# Quarterly Report

Revenue grew **12%** over the quarter.

```mermaid
graph TD; A-->B;
```

| Region | Revenue | Growth |
|--------|---------|--------|
| North  | 1.2M    | 10%    |
| South  | 0.9M    | 15%    |

```mermaid
sequenceDiagram; A->>B: hi
```
";

fn read_part(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut s = String::new();
    file.read_to_string(&mut s).unwrap();
    Some(s)
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(String::from).collect()
}

fn offline() -> Engine {
    Engine::offline(EngineConfig::default())
}

#[test]
fn test_docx_with_rendered_diagrams() {
    let engine = offline().with_renderer(PngRenderer);
    let bytes = engine.render_docx(REPORT, "report.docx").unwrap();

    let document = read_part(&bytes, "word/document.xml").unwrap();
    assert!(document.contains("Revenue grew"));
    assert_eq!(document.matches("<w:gridCol ").count(), 3);

    let rels = Relationships::parse(read_part(&bytes, "word/_rels/document.xml.rels").unwrap().as_bytes()).unwrap();
    let media: HashSet<String> = rels
        .iter()
        .filter(|r| r.rel_type == Relationships::TYPE_IMAGE)
        .map(|r| r.target.clone())
        .collect();
    assert_eq!(media.len(), 2);

    let names = part_names(&bytes);
    for target in &media {
        let path = format!("word/{}", target);
        assert_eq!(names.iter().filter(|n| **n == path).count(), 1, "{}", path);
    }
    assert!(read_part(&bytes, "docProps/core.xml")
        .unwrap()
        .contains("<dc:title>report</dc:title>"));
}

#[test]
fn test_docx_survives_renderer_outage() {
    let engine = offline().with_renderer(DownRenderer);
    let bytes = engine
        .render_docx("Intro paragraph.\n\n```mermaid\ngraph TD; A-->B;\n```\n", "notes.docx")
        .unwrap();

    let document = read_part(&bytes, "word/document.xml").unwrap();
    assert!(document.contains("Intro paragraph."));
    assert!(document.contains("graph TD; A--&gt;B;"));
    assert!(!part_names(&bytes).iter().any(|n| n.starts_with("word/media/")));
}

#[test]
fn test_docx_prose_mentioning_image_scheme() {
    let bytes = offline()
        .render_docx("Images use the mdoffice-image:logo scheme internally.", "t.docx")
        .unwrap();

    let document = read_part(&bytes, "word/document.xml").unwrap();
    assert!(document.contains("mdoffice-image:logo scheme"));
    assert!(!part_names(&bytes).iter().any(|n| n.starts_with("word/media/")));
}

#[test]
fn test_pptx_bullet_mentioning_image_scheme() {
    let bytes = offline()
        .render_pptx("## Notes\n- see mdoffice-image:x", "notes.pptx", &DeckOptions::new())
        .unwrap();
    assert!(read_part(&bytes, "ppt/slides/slide1.xml")
        .unwrap()
        .contains("see mdoffice-image:x"));
}

#[test]
fn test_docx_rejects_invalid_utf8() {
    let err = offline().render_docx_bytes(&[b'#', b' ', 0xC3, 0x28], "bad.docx").unwrap_err();
    assert!(matches!(err, EngineError::Core(_)));
}

#[test]
fn test_docx_from_reader() {
    let bytes = offline()
        .render_docx_from_reader(Cursor::new("# From a stream"), "stream.docx")
        .unwrap();
    assert!(read_part(&bytes, "word/document.xml")
        .unwrap()
        .contains("From a stream"));
}

#[test]
fn test_docx_template_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let template = offline().render_docx("# Letterhead", "letterhead.docx").unwrap();
    std::fs::write(dir.path().join("letterhead.docx"), template).unwrap();

    let config = EngineConfig::from_toml_str(&format!(
        "[templates]\ndir = {:?}\n\n[docx]\ntemplate = \"letterhead.docx\"\n",
        dir.path().display().to_string()
    ))
    .unwrap();
    let bytes = Engine::offline(config).render_docx("Body text", "memo.docx").unwrap();

    let document = read_part(&bytes, "word/document.xml").unwrap();
    assert!(document.contains("Body text"));
    assert!(!document.contains("Letterhead"));
}

#[test]
fn test_pptx_with_diagram_slide() {
    let engine = offline().with_renderer(PngRenderer);
    let markdown = "# Design\n\n## Architecture\n```mermaid\ngraph LR; A-->B;\n```\n";
    let bytes = engine.render_pptx(markdown, "design.pptx", &DeckOptions::new()).unwrap();

    let names = part_names(&bytes);
    assert!(names.iter().any(|n| n == "ppt/media/image1.png"));
    let slide = read_part(&bytes, "ppt/slides/slide2.xml").unwrap();
    assert!(slide.contains("<p:pic>"));
    assert!(slide.contains(r#"r:embed="rId2""#));
}

#[test]
fn test_pptx_diagram_outage_keeps_source() {
    let engine = offline().with_renderer(DownRenderer);
    let markdown = "## Flow\n```mermaid\ngraph LR; A-->B;\n```\n";
    let bytes = engine.render_pptx(markdown, "flow.pptx", &DeckOptions::new()).unwrap();

    let slide = read_part(&bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide.contains("graph LR; A--&gt;B;"));
    assert!(!part_names(&bytes).iter().any(|n| n.starts_with("ppt/media/")));
}

#[test]
fn test_pptx_named_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = offline()
        .render_pptx("# Old\n## Old body\n- x", "corporate.pptx", &DeckOptions::new())
        .unwrap();
    std::fs::write(dir.path().join("corporate.pptx"), template).unwrap();

    let mut config = EngineConfig::default();
    config.templates.dir = dir.path().to_path_buf();
    let engine = Engine::offline(config);

    let options = DeckOptions::new().with_template(TemplateSelector::Named("corporate".to_string()));
    let bytes = engine.render_pptx("## New\n- y", "new.pptx", &options).unwrap();
    assert!(!part_names(&bytes).iter().any(|n| n == "ppt/slides/slide2.xml"));
    assert!(read_part(&bytes, "ppt/slides/slide1.xml").unwrap().contains("<a:t>y</a:t>"));

    // A template named through the style properties
    let options = DeckOptions::new().with_style(DeckStyle::new().with_property("template", "corporate"));
    assert!(engine.render_pptx("## New", "new.pptx", &options).is_ok());

    let options = DeckOptions::new().with_template(TemplateSelector::Named("missing".to_string()));
    let err = engine.render_pptx("## New", "new.pptx", &options).unwrap_err();
    assert!(matches!(err, EngineError::UnknownTemplate(name) if name == "missing"));
}

#[test]
fn test_pptx_template_from_bytes() {
    let template = offline()
        .render_pptx("# Old", "old.pptx", &DeckOptions::new())
        .unwrap();
    let options = DeckOptions::new().with_template(TemplateSelector::Bytes(template));
    let bytes = offline().render_pptx("# Fresh", "fresh.pptx", &options).unwrap();
    assert!(read_part(&bytes, "ppt/slides/slide1.xml").unwrap().contains("Fresh"));

    let options = DeckOptions::new().with_template(TemplateSelector::Bytes(b"garbage".to_vec()));
    let err = offline().render_pptx("# Fresh", "fresh.pptx", &options).unwrap_err();
    assert_eq!(err.code(), "PPTX002");
}

#[test]
fn test_cancelled_conversions_return_nothing() {
    let engine = offline();
    let token = CancelToken::new();
    token.cancel();

    let err = engine
        .render_docx_cancellable("# Report", "report.docx", &token)
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));

    let err = engine
        .render_pptx_cancellable("# Deck", "deck.pptx", &DeckOptions::new(), &token)
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
}

#[test]
fn test_engine_serves_threads() {
    let engine = Arc::new(offline().with_renderer(PngRenderer));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let markdown = format!("# Doc {}\n\n```mermaid\ngraph TD; A-->B{};\n```\n", i, i);
                engine.render_docx(&markdown, "doc.docx").unwrap()
            })
        })
        .collect();

    for handle in handles {
        let bytes = handle.join().unwrap();
        assert!(part_names(&bytes).iter().any(|n| n == "word/media/image1.png"));
    }
}

#[test]
fn test_model_types_through_facade() {
    let layout: mdoffice::SlideLayout = "quote".parse().unwrap();
    assert_eq!(layout, mdoffice::SlideLayout::Quote);
    assert_eq!(mdoffice::Block::paragraph("x").plain_text(), "x");
    assert!(mdoffice::ImageSet::new().is_empty());
}
