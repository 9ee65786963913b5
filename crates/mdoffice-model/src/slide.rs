//! Outline model for slide decks
//!
//! An [`Outline`] is a flat sequence of typed slides. Content lines are plain
//! strings; a few string prefixes carry extra structure, see
//! [`ContentLine`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix of a third-level bullet line
pub const MARKER_LEVEL3: &str = "L3:";
/// Prefix of a quote embedded in column text
pub const MARKER_QUOTE: &str = "Q:";
/// Prefix of an image embedded in column text, encoded `IMG:<alt>|<url>`
pub const MARKER_IMAGE: &str = "IMG:";

const MARKERS: [&str; 3] = [MARKER_LEVEL3, MARKER_QUOTE, MARKER_IMAGE];

/// Semantic role of a slide, selecting its shape template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    /// Opening slide with a large centered title
    Title,
    /// Title and bullet body
    #[default]
    Content,
    /// A standalone quotation
    Quote,
    /// Closing slide
    ThankYou,
    /// Section divider
    Subsection,
    /// Title and two content columns
    TwoColumn,
    /// Picture-focused slide
    Image,
}

impl SlideLayout {
    pub const ALL: [SlideLayout; 7] = [
        SlideLayout::Title,
        SlideLayout::Content,
        SlideLayout::Quote,
        SlideLayout::ThankYou,
        SlideLayout::Subsection,
        SlideLayout::TwoColumn,
        SlideLayout::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlideLayout::Title => "title",
            SlideLayout::Content => "content",
            SlideLayout::Quote => "quote",
            SlideLayout::ThankYou => "thank_you",
            SlideLayout::Subsection => "subsection",
            SlideLayout::TwoColumn => "two_column",
            SlideLayout::Image => "image",
        }
    }
}

impl fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a layout name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayout(pub String);

impl fmt::Display for UnknownLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown slide layout: {}", self.0)
    }
}

impl std::error::Error for UnknownLayout {}

impl FromStr for SlideLayout {
    type Err = UnknownLayout;

    /// Accepts `two-column`, `two_column`, `TwoColumn` and similar spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "title" => Ok(SlideLayout::Title),
            "content" | "bullets" => Ok(SlideLayout::Content),
            "quote" => Ok(SlideLayout::Quote),
            "thankyou" | "thanks" | "end" => Ok(SlideLayout::ThankYou),
            "subsection" | "section" => Ok(SlideLayout::Subsection),
            "twocolumn" | "twocolumns" | "columns" => Ok(SlideLayout::TwoColumn),
            "image" | "picture" => Ok(SlideLayout::Image),
            _ => Err(UnknownLayout(s.to_string())),
        }
    }
}

/// One slide of an outline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideContent {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Body lines, possibly carrying content markers
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub layout: SlideLayout,
    #[serde(default)]
    pub left_column: Vec<String>,
    #[serde(default)]
    pub right_column: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    /// Heading depth that opened the slide (0 for quote slides)
    #[serde(default)]
    pub level: u8,
    /// Diagram source found in the slide, not yet rendered
    #[serde(default)]
    pub diagram: Option<String>,
    /// Placeholder id of the rendered diagram
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl SlideContent {
    pub fn new(title: impl Into<String>, layout: SlideLayout, level: u8) -> Self {
        Self {
            title: title.into(),
            layout,
            level,
            ..Default::default()
        }
    }

    /// True when the slide has no body lines in any column
    pub fn has_no_body(&self) -> bool {
        self.content.is_empty() && self.left_column.is_empty() && self.right_column.is_empty()
    }

    /// True when the slide shows a picture (URL or rendered diagram)
    pub fn has_picture(&self) -> bool {
        self.image_url.is_some() || self.image_ref.is_some() || self.diagram.is_some()
    }
}

/// A flat sequence of slides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    pub slides: Vec<SlideContent>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlideContent> {
        self.slides.iter()
    }
}

/// Decoded form of a content line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLine {
    /// Ordinary bullet text
    Text(String),
    /// Third outline level
    Level3(String),
    /// Quote embedded in column text
    Quote(String),
    /// Image embedded in column text
    Image { alt: String, url: String },
}

impl ContentLine {
    /// Decode a stored content line
    ///
    /// A single leading backslash before a marker prefix makes the line
    /// literal text and is stripped.
    pub fn decode(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix('\\') {
            if MARKERS.iter().any(|m| rest.starts_with(m)) {
                return ContentLine::Text(rest.to_string());
            }
        }
        if let Some(rest) = line.strip_prefix(MARKER_LEVEL3) {
            return ContentLine::Level3(rest.trim_start().to_string());
        }
        if let Some(rest) = line.strip_prefix(MARKER_QUOTE) {
            return ContentLine::Quote(rest.trim_start().to_string());
        }
        if let Some(rest) = line.strip_prefix(MARKER_IMAGE) {
            let (alt, url) = rest.split_once('|').unwrap_or(("", rest));
            return ContentLine::Image {
                alt: alt.trim().to_string(),
                url: url.trim().to_string(),
            };
        }
        ContentLine::Text(line.to_string())
    }

    /// Encode into the stored string form
    pub fn encode(&self) -> String {
        match self {
            ContentLine::Text(text) => escape_literal(text),
            ContentLine::Level3(text) => format!("{}{}", MARKER_LEVEL3, text),
            ContentLine::Quote(text) => format!("{}{}", MARKER_QUOTE, text),
            ContentLine::Image { alt, url } => format!("{}{}|{}", MARKER_IMAGE, alt, url),
        }
    }
}

/// Protect user text that happens to start with a marker prefix
pub fn escape_literal(text: &str) -> String {
    if MARKERS.iter().any(|m| text.starts_with(m)) {
        format!("\\{}", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str_spellings() {
        assert_eq!("two-column".parse::<SlideLayout>(), Ok(SlideLayout::TwoColumn));
        assert_eq!("TwoColumn".parse::<SlideLayout>(), Ok(SlideLayout::TwoColumn));
        assert_eq!("thank_you".parse::<SlideLayout>(), Ok(SlideLayout::ThankYou));
        assert_eq!("Section".parse::<SlideLayout>(), Ok(SlideLayout::Subsection));
        assert!("sideways".parse::<SlideLayout>().is_err());
    }

    #[test]
    fn test_layout_round_trips_through_name() {
        for layout in SlideLayout::ALL {
            assert_eq!(layout.as_str().parse::<SlideLayout>(), Ok(layout));
        }
    }

    #[test]
    fn test_decode_markers() {
        assert_eq!(
            ContentLine::decode("L3:deep point"),
            ContentLine::Level3("deep point".into())
        );
        assert_eq!(
            ContentLine::decode("Q: be brief"),
            ContentLine::Quote("be brief".into())
        );
        assert_eq!(
            ContentLine::decode("IMG:Logo|https://x/logo.png"),
            ContentLine::Image {
                alt: "Logo".into(),
                url: "https://x/logo.png".into()
            }
        );
        assert_eq!(
            ContentLine::decode("plain"),
            ContentLine::Text("plain".into())
        );
    }

    #[test]
    fn test_literal_marker_text_is_escaped() {
        let stored = escape_literal("L3: is a level name");
        assert_eq!(stored, "\\L3: is a level name");
        assert_eq!(
            ContentLine::decode(&stored),
            ContentLine::Text("L3: is a level name".into())
        );
        // Backslashes elsewhere are untouched
        assert_eq!(
            ContentLine::decode("\\not a marker"),
            ContentLine::Text("\\not a marker".into())
        );
    }

    #[test]
    fn test_slide_predicates() {
        let mut slide = SlideContent::new("A", SlideLayout::Content, 2);
        assert!(slide.has_no_body());
        assert!(!slide.has_picture());
        slide.right_column.push("x".into());
        slide.image_url = Some("a.png".into());
        assert!(!slide.has_no_body());
        assert!(slide.has_picture());
    }
}
