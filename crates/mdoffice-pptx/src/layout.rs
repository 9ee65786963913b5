//! Slide layouts: shape frames and template layout kinds.
//!
//! Every [`SlideLayout`] has a fixed set of frames (absolute positions and
//! sizes in EMU) defined for a 16:9 slide of 12 192 000 × 6 858 000 EMU and
//! scaled proportionally to the actual slide size. Template layouts are
//! classified into [`LayoutKind`]s so that each semantic layout can be
//! mapped onto the closest layout a template offers.

use mdoffice_model::SlideLayout;

use crate::constants::{WIDESCREEN_SLIDE_HEIGHT_EMU, WIDESCREEN_SLIDE_WIDTH_EMU};

/// Position and size of a shape in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Scale a 16:9 reference frame to a slide of the given size
    pub fn scaled(self, slide_size: (i64, i64)) -> Self {
        let (width, height) = slide_size;
        let sx = |v: i64| v * width / WIDESCREEN_SLIDE_WIDTH_EMU;
        let sy = |v: i64| v * height / WIDESCREEN_SLIDE_HEIGHT_EMU;
        Self {
            x: sx(self.x),
            y: sy(self.y),
            cx: sx(self.cx),
            cy: sy(self.cy),
        }
    }

    /// Largest frame of the given aspect ratio centered inside this one
    pub fn fit(self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return self;
        }
        let (w, h) = (width as i64, height as i64);
        // Compare cx/cy with w/h without floating point
        if self.cx * h > self.cy * w {
            let cx = self.cy * w / h;
            Self::new(self.x + (self.cx - cx) / 2, self.y, cx, self.cy)
        } else {
            let cy = self.cx * h / w;
            Self::new(self.x, self.y + (self.cy - cy) / 2, self.cx, cy)
        }
    }

    /// Upper part of the frame, `numerator / denominator` of its height
    fn top(self, numerator: i64, denominator: i64) -> Self {
        Self::new(self.x, self.y, self.cx, self.cy * numerator / denominator)
    }

    /// Lower part of the frame, `numerator / denominator` of its height
    fn bottom(self, numerator: i64, denominator: i64) -> Self {
        let cy = self.cy * numerator / denominator;
        Self::new(self.x, self.y + self.cy - cy, self.cx, cy)
    }
}

/// Frames of one layout
///
/// `title` always exists. Text of a slide without a body frame flows into
/// the subtitle frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeFrames {
    pub title: Frame,
    pub subtitle: Option<Frame>,
    pub body: Option<Frame>,
    pub columns: Option<(Frame, Frame)>,
    /// Where a picture goes
    pub picture: Frame,
    /// Caption under the picture
    pub caption: Option<Frame>,
}

const TITLE_BAR: Frame = Frame::new(838_200, 365_125, 10_515_600, 1_325_563);
const BODY: Frame = Frame::new(838_200, 1_825_625, 10_515_600, 4_351_338);
const LEFT_COLUMN: Frame = Frame::new(838_200, 1_825_625, 5_181_600, 4_351_338);
const RIGHT_COLUMN: Frame = Frame::new(6_172_200, 1_825_625, 5_181_600, 4_351_338);
const CORNER_PICTURE: Frame = Frame::new(8_534_400, 4_114_800, 2_819_400, 2_286_000);

impl ShapeFrames {
    /// Reference frames of a layout on a 16:9 slide
    ///
    /// With `has_picture` the content and two-column layouts make room for
    /// the picture; the other layouts show it in the lower right corner.
    pub fn reference(layout: SlideLayout, has_picture: bool) -> Self {
        match layout {
            SlideLayout::Title => Self {
                title: Frame::new(1_524_000, 1_122_363, 9_144_000, 2_387_600),
                subtitle: Some(Frame::new(1_524_000, 3_602_038, 9_144_000, 1_655_762)),
                body: None,
                columns: None,
                picture: CORNER_PICTURE,
                caption: None,
            },
            SlideLayout::Content if has_picture => Self {
                title: TITLE_BAR,
                subtitle: None,
                body: Some(Frame::new(838_200, 1_825_625, 6_096_000, 4_351_338)),
                columns: None,
                picture: Frame::new(7_162_800, 1_825_625, 4_191_000, 4_351_338),
                caption: None,
            },
            SlideLayout::Content => Self {
                title: TITLE_BAR,
                subtitle: None,
                body: Some(BODY),
                columns: None,
                picture: CORNER_PICTURE,
                caption: None,
            },
            SlideLayout::Quote => Self {
                title: Frame::new(1_371_600, 1_600_200, 9_448_800, 2_743_200),
                subtitle: Some(Frame::new(1_371_600, 4_572_000, 9_448_800, 914_400)),
                body: None,
                columns: None,
                picture: CORNER_PICTURE,
                caption: None,
            },
            SlideLayout::ThankYou => Self {
                title: Frame::new(838_200, 2_286_000, 10_515_600, 1_371_600),
                subtitle: Some(Frame::new(838_200, 3_810_000, 10_515_600, 914_400)),
                body: Some(Frame::new(838_200, 4_800_600, 10_515_600, 1_371_600)),
                columns: None,
                picture: CORNER_PICTURE,
                caption: None,
            },
            SlideLayout::Subsection => Self {
                title: Frame::new(831_850, 1_709_738, 10_515_600, 2_852_737),
                subtitle: Some(Frame::new(831_850, 4_589_463, 10_515_600, 1_500_187)),
                body: None,
                columns: None,
                picture: CORNER_PICTURE,
                caption: None,
            },
            SlideLayout::TwoColumn => Self {
                title: TITLE_BAR,
                subtitle: None,
                body: None,
                columns: Some(if has_picture {
                    (LEFT_COLUMN, RIGHT_COLUMN.top(1, 2))
                } else {
                    (LEFT_COLUMN, RIGHT_COLUMN)
                }),
                picture: RIGHT_COLUMN.bottom(1, 2),
                caption: None,
            },
            SlideLayout::Image => Self {
                title: TITLE_BAR,
                subtitle: None,
                body: None,
                columns: None,
                picture: BODY,
                caption: Some(Frame::new(838_200, 6_217_920, 10_515_600, 457_200)),
            },
        }
    }

    /// Frames of a layout scaled to the slide size
    pub fn for_slide(layout: SlideLayout, has_picture: bool, slide_size: (i64, i64)) -> Self {
        let frames = Self::reference(layout, has_picture);
        Self {
            title: frames.title.scaled(slide_size),
            subtitle: frames.subtitle.map(|f| f.scaled(slide_size)),
            body: frames.body.map(|f| f.scaled(slide_size)),
            columns: frames
                .columns
                .map(|(l, r)| (l.scaled(slide_size), r.scaled(slide_size))),
            picture: frames.picture.scaled(slide_size),
            caption: frames.caption.map(|f| f.scaled(slide_size)),
        }
    }
}

/// Standard layout types in PPTX
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Title slide (title)
    Title,

    /// Title and content (obj)
    TitleAndContent,

    /// Section header (secHead)
    SectionHeader,

    /// Two content (twoObj)
    TwoContent,

    /// Comparison (twoTxTwoObj)
    Comparison,

    /// Title only (titleOnly)
    TitleOnly,

    /// Blank
    Blank,

    /// Picture with caption (picTx)
    PictureWithCaption,

    /// Content with caption (objTx)
    ContentWithCaption,

    /// Custom layout
    Custom,
}

impl LayoutKind {
    /// Get the OOXML type attribute value
    pub fn ooxml_type(&self) -> Option<&'static str> {
        match self {
            Self::Title => Some("title"),
            Self::TitleAndContent => Some("obj"),
            Self::SectionHeader => Some("secHead"),
            Self::TwoContent => Some("twoObj"),
            Self::Comparison => Some("twoTxTwoObj"),
            Self::TitleOnly => Some("titleOnly"),
            Self::Blank => Some("blank"),
            Self::PictureWithCaption => Some("picTx"),
            Self::ContentWithCaption => Some("objTx"),
            Self::Custom => None,
        }
    }

    /// Parse from the `type` attribute of `p:sldLayout`
    pub fn from_ooxml_type(s: &str) -> Self {
        match s {
            "title" => Self::Title,
            "obj" | "tx" => Self::TitleAndContent,
            "secHead" => Self::SectionHeader,
            "twoObj" | "twoColTx" => Self::TwoContent,
            "twoTxTwoObj" => Self::Comparison,
            "titleOnly" => Self::TitleOnly,
            "blank" => Self::Blank,
            "picTx" => Self::PictureWithCaption,
            "objTx" => Self::ContentWithCaption,
            _ => Self::Custom,
        }
    }

    /// Infer the kind from a layout name
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("title slide") {
            Self::Title
        } else if name.contains("section") {
            Self::SectionHeader
        } else if name.contains("comparison") {
            Self::Comparison
        } else if name.contains("two") {
            Self::TwoContent
        } else if name.contains("blank") {
            Self::Blank
        } else if name.contains("title only") {
            Self::TitleOnly
        } else if name.contains("picture") {
            Self::PictureWithCaption
        } else if name.contains("caption") {
            Self::ContentWithCaption
        } else if name.contains("content") {
            Self::TitleAndContent
        } else {
            Self::Custom
        }
    }

    /// Template layout kinds suitable for a semantic layout, best first
    pub fn preferred_for(layout: SlideLayout) -> &'static [LayoutKind] {
        match layout {
            SlideLayout::Title => &[Self::Title],
            SlideLayout::Content => &[Self::TitleAndContent, Self::ContentWithCaption],
            SlideLayout::Quote => &[Self::TitleOnly, Self::SectionHeader],
            SlideLayout::ThankYou => &[Self::Title, Self::SectionHeader],
            SlideLayout::Subsection => &[Self::SectionHeader, Self::TitleOnly],
            SlideLayout::TwoColumn => &[Self::TwoContent, Self::Comparison],
            SlideLayout::Image => &[Self::PictureWithCaption, Self::TitleOnly, Self::Blank],
        }
    }

    /// Kind of the built-in layout generated for a semantic layout
    pub fn builtin_for(layout: SlideLayout) -> Self {
        Self::preferred_for(layout)[0]
    }
}
