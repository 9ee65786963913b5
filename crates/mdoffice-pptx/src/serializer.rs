//! Slide serializer: one [`SlideContent`] to one `ppt/slides/slideN.xml` part.
//!
//! The slide layout selects a fixed set of frames (see [`ShapeFrames`]);
//! title, subtitle, body and column shapes are written with absolute
//! positions so that the slide looks the same on any master. Content lines
//! are decoded with [`ContentLine`] and their inline emphasis is turned
//! into runs. Pictures reference their image through a placeholder token
//! that the assembler later replaces with a relationship id.

use std::collections::HashMap;

use mdoffice_core::parse_runs;
use mdoffice_model::{ContentLine, ImageSet, Run, SlideContent, SlideLayout};
use mdoffice_ooxml::relationships::relative_target;
use mdoffice_ooxml::xml::XML_DECLARATION;
use mdoffice_ooxml::{escape_xml, placeholder_token, FormatSerializer, Relationships, SerializedPart};

use crate::constants::*;
use crate::deck::builtin_layout_part;
use crate::layout::{Frame, ShapeFrames};
use crate::style::DeckStyle;

/// Bullet of ordinary body lines
const BULLET: &str = "\u{2022}";
/// Bullet of third-level lines
const BULLET_LEVEL3: &str = "\u{2013}";
/// Monospace face for inline code
const CODE_FONT: &str = "Consolas";

/// A slide together with its 1-based position in the deck
#[derive(Debug, Clone, Copy)]
pub struct NumberedSlide<'a> {
    pub index: usize,
    pub slide: &'a SlideContent,
}

impl<'a> NumberedSlide<'a> {
    pub fn new(index: usize, slide: &'a SlideContent) -> Self {
        Self { index, slide }
    }
}

/// Serializes slides for one deck
#[derive(Debug, Clone)]
pub struct SlideSerializer<'s> {
    style: &'s DeckStyle,
    slide_size: (i64, i64),
    /// Package path of the layout part used for each semantic layout
    layout_parts: HashMap<SlideLayout, String>,
}

impl<'s> SlideSerializer<'s> {
    /// Serializer targeting the built-in layouts
    pub fn new(style: &'s DeckStyle, slide_size: (i64, i64)) -> Self {
        let layout_parts = SlideLayout::ALL
            .iter()
            .map(|&layout| (layout, builtin_layout_part(layout)))
            .collect();
        Self {
            style,
            slide_size,
            layout_parts,
        }
    }

    /// Replace the layout part mapping, e.g. with template layouts
    pub fn with_layout_parts(mut self, layout_parts: HashMap<SlideLayout, String>) -> Self {
        self.layout_parts = layout_parts;
        self
    }

    /// Layout part of a semantic layout, falling back to the content layout
    pub fn layout_part(&self, layout: SlideLayout) -> String {
        self.layout_parts
            .get(&layout)
            .or_else(|| self.layout_parts.get(&SlideLayout::Content))
            .cloned()
            .unwrap_or_else(|| builtin_layout_part(SlideLayout::Content))
    }

    /// Reserved entries of a slide part: rId1 is its layout
    pub fn reserved_relationships(
        &self,
        index: usize,
        layout: SlideLayout,
    ) -> mdoffice_ooxml::Result<Relationships> {
        let mut rels = Relationships::with_reserved(SLIDE_RESERVED_RELATIONSHIPS);
        let target = relative_target(&slide_part(index), &self.layout_part(layout));
        rels.insert("rId1", target, REL_TYPE_SLIDE_LAYOUT)?;
        Ok(rels)
    }
}

impl FormatSerializer<NumberedSlide<'_>> for SlideSerializer<'_> {
    fn serialize(&self, input: &NumberedSlide<'_>, images: &ImageSet) -> mdoffice_ooxml::Result<SerializedPart> {
        let slide = input.slide;
        let mut writer = ShapeWriter::new(self.style, images);
        writer.generate_slide(slide, self.slide_size);

        log::debug!(
            "Slide {} serialized with layout {}",
            input.index,
            slide.layout
        );
        Ok(SerializedPart {
            xml: writer.finish(),
            relationships: self.reserved_relationships(input.index, slide.layout)?,
        })
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn attribute(self) -> &'static str {
        match self {
            Align::Left => "",
            Align::Center => r#" algn="ctr""#,
            Align::Right => r#" algn="r""#,
        }
    }
}

/// Character formatting added on top of a run's own flags
#[derive(Debug, Clone, Default)]
struct RunFormat {
    italic: bool,
    underline: bool,
    color: Option<String>,
    /// Hundredths of a point
    size: Option<u32>,
}

struct ShapeWriter<'a> {
    style: &'a DeckStyle,
    images: &'a ImageSet,
    shapes: String,
    next_id: u32,
}

impl<'a> ShapeWriter<'a> {
    fn new(style: &'a DeckStyle, images: &'a ImageSet) -> Self {
        Self {
            style,
            images,
            shapes: String::new(),
            // 1 is the group shape of the tree
            next_id: 2,
        }
    }

    fn finish(self) -> String {
        format!(
            r#"{}
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
            XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, self.shapes
        )
    }

    fn generate_slide(&mut self, slide: &SlideContent, slide_size: (i64, i64)) {
        let has_picture = slide.image_ref.is_some() || slide.image_url.is_some();
        let frames = ShapeFrames::for_slide(slide.layout, has_picture, slide_size);

        match slide.layout {
            SlideLayout::Title | SlideLayout::ThankYou => self.generate_title_layout(slide, &frames),
            SlideLayout::Subsection => self.generate_section_layout(slide, &frames),
            SlideLayout::Quote => self.generate_quote_layout(slide, &frames),
            SlideLayout::Content => self.generate_content_layout(slide, &frames),
            SlideLayout::TwoColumn => self.generate_two_column_layout(slide, &frames),
            SlideLayout::Image => self.generate_image_layout(slide, &frames),
        }

        if slide.layout != SlideLayout::Image && has_picture {
            self.generate_picture_or_caption(slide, frames.picture);
        }
    }

    fn generate_title_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        self.generate_title(&slide.title, r#"<p:ph type="ctrTitle"/>"#, frames.title, "ctr", Align::Center);

        let mut paragraphs = String::new();
        if let Some(subtitle) = &slide.subtitle {
            paragraphs.push_str(&self.plain_paragraph(subtitle, Align::Center, &RunFormat::default()));
        }
        if slide.layout == SlideLayout::Title {
            for line in body_lines(slide) {
                paragraphs.push_str(&self.plain_paragraph(line, Align::Center, &RunFormat::default()));
            }
        }
        if let Some(frame) = frames.subtitle.filter(|_| !paragraphs.is_empty()) {
            self.generate_text_shape(
                "Subtitle",
                Some(r#"<p:ph type="subTitle" idx="1"/>"#),
                frame,
                "t",
                &paragraphs,
            );
        }

        if slide.layout == SlideLayout::ThankYou {
            let paragraphs: String = body_lines(slide)
                .into_iter()
                .map(|line| self.plain_paragraph(line, Align::Center, &RunFormat::default()))
                .collect();
            if let Some(frame) = frames.body.filter(|_| !paragraphs.is_empty()) {
                self.generate_text_shape("Text", None, frame, "t", &paragraphs);
            }
        }
    }

    fn generate_section_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        self.generate_title(&slide.title, r#"<p:ph type="title"/>"#, frames.title, "b", Align::Left);

        let mut paragraphs = String::new();
        if let Some(subtitle) = &slide.subtitle {
            paragraphs.push_str(&self.plain_paragraph(subtitle, Align::Left, &RunFormat::default()));
        }
        for line in body_lines(slide) {
            paragraphs.push_str(&self.plain_paragraph(line, Align::Left, &RunFormat::default()));
        }
        if let Some(frame) = frames.subtitle.filter(|_| !paragraphs.is_empty()) {
            self.generate_text_shape(
                "Text",
                Some(r#"<p:ph type="body" idx="1"/>"#),
                frame,
                "t",
                &paragraphs,
            );
        }
    }

    fn generate_quote_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        let quote = RunFormat {
            italic: true,
            color: self.style.theme_color_hex(),
            size: Some(3200),
            ..Default::default()
        };
        let text = format!("\u{201C}{}\u{201D}", slide.title);
        let paragraph = self.plain_paragraph(&text, Align::Center, &quote);
        self.generate_text_shape(
            "Title",
            Some(r#"<p:ph type="title"/>"#),
            frames.title,
            "ctr",
            &paragraph,
        );

        let mut paragraphs = String::new();
        if let Some(author) = &slide.subtitle {
            let attribution = format!("\u{2014} {}", author);
            paragraphs.push_str(&self.plain_paragraph(&attribution, Align::Right, &RunFormat::default()));
        }
        for line in body_lines(slide) {
            paragraphs.push_str(&self.plain_paragraph(line, Align::Right, &RunFormat::default()));
        }
        if let Some(frame) = frames.subtitle.filter(|_| !paragraphs.is_empty()) {
            self.generate_text_shape("Attribution", None, frame, "t", &paragraphs);
        }
    }

    fn generate_content_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        self.generate_title(&slide.title, r#"<p:ph type="title"/>"#, frames.title, "b", Align::Left);

        let paragraphs: String = body_lines(slide)
            .into_iter()
            .map(|line| self.content_paragraph(line))
            .collect();
        if let Some(frame) = frames.body.filter(|_| !paragraphs.is_empty()) {
            self.generate_text_shape("Content", Some(r#"<p:ph idx="1"/>"#), frame, "t", &paragraphs);
        }
    }

    fn generate_two_column_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        self.generate_title(&slide.title, r#"<p:ph type="title"/>"#, frames.title, "b", Align::Left);

        let Some((left_frame, right_frame)) = frames.columns else {
            return;
        };
        // Lines before the column break open the left column
        let left: String = slide
            .content
            .iter()
            .chain(&slide.left_column)
            .map(|line| self.content_paragraph(line))
            .collect();
        let right: String = slide
            .right_column
            .iter()
            .map(|line| self.content_paragraph(line))
            .collect();

        if !left.is_empty() {
            self.generate_text_shape(
                "Left Column",
                Some(r#"<p:ph sz="half" idx="1"/>"#),
                left_frame,
                "t",
                &left,
            );
        }
        if !right.is_empty() {
            self.generate_text_shape(
                "Right Column",
                Some(r#"<p:ph sz="half" idx="2"/>"#),
                right_frame,
                "t",
                &right,
            );
        }
    }

    fn generate_image_layout(&mut self, slide: &SlideContent, frames: &ShapeFrames) {
        self.generate_title(&slide.title, r#"<p:ph type="title"/>"#, frames.title, "b", Align::Left);

        if slide.image_ref.is_none() && slide.image_url.is_none() {
            // Nothing to show: the picture area carries the text
            let paragraphs: String = body_lines(slide)
                .into_iter()
                .map(|line| self.content_paragraph(line))
                .collect();
            if !paragraphs.is_empty() {
                self.generate_text_shape("Content", Some(r#"<p:ph idx="1"/>"#), frames.picture, "t", &paragraphs);
            }
            return;
        }

        self.generate_picture_or_caption(slide, frames.picture);

        let mut paragraphs = String::new();
        if slide.image_ref.is_some() {
            if let Some(alt) = slide.image_alt.as_deref().filter(|a| !a.is_empty()) {
                let caption = RunFormat {
                    italic: true,
                    size: Some(1400),
                    ..Default::default()
                };
                paragraphs.push_str(&self.plain_paragraph(alt, Align::Center, &caption));
            }
        }
        for line in body_lines(slide) {
            paragraphs.push_str(&self.plain_paragraph(line, Align::Center, &RunFormat::default()));
        }
        if let Some(frame) = frames.caption.filter(|_| !paragraphs.is_empty()) {
            self.generate_text_shape("Caption", None, frame, "t", &paragraphs);
        }
    }

    /// Rendered picture when the slide has one, otherwise a caption naming the URL
    fn generate_picture_or_caption(&mut self, slide: &SlideContent, frame: Frame) {
        let alt = slide.image_alt.as_deref().unwrap_or("");
        if let Some(id) = &slide.image_ref {
            self.generate_picture(id, alt, frame);
        } else if let Some(url) = &slide.image_url {
            let paragraph = self.image_caption_paragraph(alt, url, Align::Center);
            self.generate_text_shape("Image", None, frame, "ctr", &paragraph);
        }
    }

    fn generate_title(&mut self, title: &str, placeholder: &str, frame: Frame, anchor: &str, align: Align) {
        if title.trim().is_empty() {
            return;
        }
        let format = RunFormat {
            color: self.style.theme_color_hex(),
            ..Default::default()
        };
        let paragraph = self.plain_paragraph(title, align, &format);
        self.generate_text_shape("Title", Some(placeholder), frame, anchor, &paragraph);
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn generate_text_shape(
        &mut self,
        name: &str,
        placeholder: Option<&str>,
        frame: Frame,
        anchor: &str,
        paragraphs: &str,
    ) {
        let id = self.take_id();
        let (shape_props, placeholder) = match placeholder {
            Some(ph) => (
                r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
                format!("<p:nvPr>{}</p:nvPr>", ph),
            ),
            None => (r#"<p:cNvSpPr txBox="1"/>"#, "<p:nvPr/>".to_string()),
        };

        self.shapes.push_str(&format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{id}" name="{name} {id}"/>
          {shape_props}
          {placeholder}
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr wrap="square" anchor="{anchor}"><a:normAutofit/></a:bodyPr>
          <a:lstStyle/>
{paragraphs}        </p:txBody>
      </p:sp>
"#,
            id = id,
            name = name,
            shape_props = shape_props,
            placeholder = placeholder,
            x = frame.x,
            y = frame.y,
            cx = frame.cx,
            cy = frame.cy,
            anchor = anchor,
            paragraphs = paragraphs,
        ));
    }

    fn generate_picture(&mut self, placeholder_id: &str, alt: &str, frame: Frame) {
        let id = self.take_id();
        let frame = match self.images.get(placeholder_id).and_then(|a| a.pixel_size()) {
            Some((w, h)) => frame.fit(w, h),
            None => frame,
        };

        self.shapes.push_str(&format!(
            r#"      <p:pic>
        <p:nvPicPr>
          <p:cNvPr id="{id}" name="Picture {id}" descr="{descr}"/>
          <p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
          <p:nvPr/>
        </p:nvPicPr>
        <p:blipFill>
          <a:blip r:embed="{embed}"/>
          <a:stretch><a:fillRect/></a:stretch>
        </p:blipFill>
        <p:spPr>
          <a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
      </p:pic>
"#,
            id = id,
            descr = escape_xml(alt),
            embed = placeholder_token(placeholder_id),
            x = frame.x,
            y = frame.y,
            cx = frame.cx,
            cy = frame.cy,
        ));
    }

    /// Body or column line, markers decoded
    fn content_paragraph(&self, line: &str) -> String {
        match ContentLine::decode(line) {
            ContentLine::Text(text) => self.bullet_paragraph(&text, 0, BULLET, &RunFormat::default()),
            ContentLine::Level3(text) => {
                let format = RunFormat {
                    italic: true,
                    ..Default::default()
                };
                self.bullet_paragraph(&text, 1, BULLET_LEVEL3, &format)
            }
            ContentLine::Quote(text) => {
                let format = RunFormat {
                    italic: true,
                    color: Some(self.style.accent_hex()),
                    ..Default::default()
                };
                let quoted = format!("\u{201C}{}\u{201D}", text);
                self.plain_paragraph(&quoted, Align::Left, &format)
            }
            ContentLine::Image { alt, url } => self.image_caption_paragraph(&alt, &url, Align::Left),
        }
    }

    fn bullet_paragraph(&self, text: &str, level: u32, bullet: &str, format: &RunFormat) -> String {
        let (margin, indent) = match level {
            0 => (342_900, -342_900),
            _ => (800_100, -228_600),
        };
        format!(
            r#"          <a:p><a:pPr marL="{}" lvl="{}" indent="{}"><a:buFont typeface="Arial"/><a:buChar char="{}"/></a:pPr>{}</a:p>
"#,
            margin,
            level,
            indent,
            bullet,
            self.runs(&parse_runs(text), format)
        )
    }

    fn plain_paragraph(&self, text: &str, align: Align, format: &RunFormat) -> String {
        format!(
            r#"          <a:p><a:pPr marL="0" indent="0"{}><a:buNone/></a:pPr>{}</a:p>
"#,
            align.attribute(),
            self.runs(&parse_runs(text), format)
        )
    }

    /// `[alt]` underlined, followed by the URL
    fn image_caption_paragraph(&self, alt: &str, url: &str, align: Align) -> String {
        let label = if alt.is_empty() { "Image" } else { alt };
        let underlined = RunFormat {
            underline: true,
            ..Default::default()
        };
        let caption = Run::plain(format!("[{}]", label));
        let mut runs = self.run(&caption, &underlined);
        if !url.is_empty() {
            runs.push_str(&self.run(&Run::plain(format!(" {}", url)), &RunFormat::default()));
        }
        format!(
            r#"          <a:p><a:pPr marL="0" indent="0"{}><a:buNone/></a:pPr>{}</a:p>
"#,
            align.attribute(),
            runs
        )
    }

    fn runs(&self, runs: &[Run], format: &RunFormat) -> String {
        if runs.iter().all(|r| r.text.is_empty()) {
            return format!(r#"<a:endParaRPr lang="{}"/>"#, escape_xml(self.style.locale()));
        }
        runs.iter().map(|run| self.run(run, format)).collect()
    }

    fn run(&self, run: &Run, format: &RunFormat) -> String {
        let mut attrs = format!(r#" lang="{}""#, escape_xml(self.style.locale()));
        if let Some(size) = format.size {
            attrs.push_str(&format!(r#" sz="{}""#, size));
        }
        if run.bold {
            attrs.push_str(r#" b="1""#);
        }
        if run.italic || format.italic {
            attrs.push_str(r#" i="1""#);
        }
        if format.underline {
            attrs.push_str(r#" u="sng""#);
        }
        attrs.push_str(r#" dirty="0""#);

        let mut children = String::new();
        if let Some(color) = &format.color {
            children.push_str(&format!(
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                color
            ));
        }
        let font = if run.code { Some(CODE_FONT) } else { self.style.font() };
        if let Some(font) = font {
            children.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape_xml(font)));
        }

        let properties = if children.is_empty() {
            format!("<a:rPr{}/>", attrs)
        } else {
            format!("<a:rPr{}>{}</a:rPr>", attrs, children)
        };
        format!("<a:r>{}<a:t>{}</a:t></a:r>", properties, escape_xml(&run.text))
    }
}

/// Every text line of a slide outside a two-column layout
fn body_lines(slide: &SlideContent) -> Vec<&str> {
    slide
        .content
        .iter()
        .chain(&slide.left_column)
        .chain(&slide.right_column)
        .map(String::as_str)
        .collect()
}
