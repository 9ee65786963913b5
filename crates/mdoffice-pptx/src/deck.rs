//! Built-in deck parts: presentation, master, layouts, theme and properties.
//!
//! A deck generated without a template gets one slide master with seven
//! layouts, one per [`SlideLayout`], in the order of [`SlideLayout::ALL`].

use mdoffice_model::SlideLayout;
use mdoffice_ooxml::xml::XML_DECLARATION;
use mdoffice_ooxml::{escape_xml, Relationships};

use crate::constants::*;
use crate::layout::{Frame, LayoutKind, ShapeFrames};
use crate::style::DeckStyle;

pub const MASTER_PART: &str = "ppt/slideMasters/slideMaster1.xml";
pub const THEME_PART: &str = "ppt/theme/theme1.xml";
pub const PRES_PROPS_PART: &str = "ppt/presProps.xml";
pub const VIEW_PROPS_PART: &str = "ppt/viewProps.xml";
pub const TABLE_STYLES_PART: &str = "ppt/tableStyles.xml";

/// Package path of the built-in layout for a semantic layout
pub fn builtin_layout_part(layout: SlideLayout) -> String {
    format!("ppt/slideLayouts/slideLayout{}.xml", layout_number(layout))
}

/// 1-based position of a layout in [`SlideLayout::ALL`]
fn layout_number(layout: SlideLayout) -> usize {
    SlideLayout::ALL
        .iter()
        .position(|&l| l == layout)
        .map_or(1, |i| i + 1)
}

/// Display name of a built-in layout
pub fn layout_name(layout: SlideLayout) -> &'static str {
    match layout {
        SlideLayout::Title => "Title Slide",
        SlideLayout::Content => "Title and Content",
        SlideLayout::Quote => "Quote",
        SlideLayout::ThankYou => "Closing",
        SlideLayout::Subsection => "Section Header",
        SlideLayout::TwoColumn => "Two Content",
        SlideLayout::Image => "Picture with Caption",
    }
}

/// `<p:sldIdLst>` for slides referenced by the given relationship ids
pub fn slide_id_list(slide_rel_ids: &[String]) -> String {
    let mut list = String::from("<p:sldIdLst>");
    for (i, rel_id) in slide_rel_ids.iter().enumerate() {
        list.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            FIRST_SLIDE_ID as usize + i,
            rel_id
        ));
    }
    list.push_str("</p:sldIdLst>");
    list
}

/// `ppt/presentation.xml`
pub fn presentation_xml(slide_rel_ids: &[String], slide_size: (i64, i64)) -> String {
    let slide_list = if slide_rel_ids.is_empty() {
        String::new()
    } else {
        format!("  {}\n", slide_id_list(slide_rel_ids))
    };

    format!(
        r#"{}
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="{}" r:id="rId1"/>
  </p:sldMasterIdLst>
{}  <p:sldSz cx="{}" cy="{}"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        FIRST_MASTER_ID,
        slide_list,
        slide_size.0,
        slide_size.1,
        slide_size.1, // Notes are rotated
        slide_size.0
    )
}

/// Reserved presentation relationships; slides follow from rId6
pub fn presentation_relationships() -> mdoffice_ooxml::Result<Relationships> {
    let mut rels = Relationships::with_reserved(PRESENTATION_RESERVED_RELATIONSHIPS);
    let reserved = [
        ("slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER),
        ("theme/theme1.xml", REL_TYPE_THEME),
        ("presProps.xml", REL_TYPE_PRES_PROPS),
        ("viewProps.xml", REL_TYPE_VIEW_PROPS),
        ("tableStyles.xml", REL_TYPE_TABLE_STYLES),
    ];
    for (i, (target, rel_type)) in reserved.iter().enumerate() {
        rels.insert(format!("rId{}", i + 1), *target, *rel_type)?;
    }
    Ok(rels)
}

/// `ppt/presProps.xml`
pub fn pres_props_xml() -> String {
    format!(
        r#"{}
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

/// `ppt/tableStyles.xml`
pub fn table_styles_xml() -> String {
    format!(
        r#"{}
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECLARATION, NS_DRAWING
    )
}

/// `ppt/viewProps.xml`
pub fn view_props_xml() -> String {
    format!(
        r#"{}
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:normalViewPr>
    <p:restoredLeft sz="15620"/>
    <p:restoredTop sz="94660"/>
  </p:normalViewPr>
  <p:slideViewPr>
    <p:cSldViewPr>
      <p:cViewPr>
        <p:scale>
          <a:sx n="100" d="100"/>
          <a:sy n="100" d="100"/>
        </p:scale>
        <p:origin x="0" y="0"/>
      </p:cViewPr>
    </p:cSldViewPr>
  </p:slideViewPr>
</p:viewPr>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

/// `ppt/theme/theme1.xml` with the style's accent colour and font
pub fn theme_xml(style: &DeckStyle) -> String {
    let accent = style.accent_hex();
    let dark = style.theme_color_hex().unwrap_or_else(|| "44546A".to_string());
    let (major, minor) = match style.font() {
        Some(font) => (escape_xml(font), escape_xml(font)),
        None => ("Calibri Light".to_string(), "Calibri".to_string()),
    };

    format!(
        r#"{}
<a:theme xmlns:a="{}" name="mdoffice">
  <a:themeElements>
    <a:clrScheme name="mdoffice">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="{dark}"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="{accent}"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="mdoffice">
      <a:majorFont>
        <a:latin typeface="{major}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="{minor}"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
        XML_DECLARATION,
        NS_DRAWING,
        dark = dark,
        accent = accent,
        major = major,
        minor = minor,
    )
}

/// `ppt/slideMasters/slideMaster1.xml`, listing every built-in layout
pub fn slide_master_xml() -> String {
    let layout_ids: String = (1..=SlideLayout::ALL.len())
        .map(|i| {
            format!(
                "    <p:sldLayoutId id=\"{}\" r:id=\"rId{}\"/>\n",
                FIRST_MASTER_ID as u64 + i as u64,
                i
            )
        })
        .collect();

    format!(
        r#"{}
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg>
      <p:bgRef idx="1001">
        <a:schemeClr val="bg1"/>
      </p:bgRef>
    </p:bg>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
{}  </p:sldLayoutIdLst>
  <p:txStyles>
    <p:titleStyle>
      <a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr>
    </p:titleStyle>
    <p:bodyStyle>
      <a:lvl1pPr marL="228600" indent="-228600"><a:defRPr sz="2800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr>
      <a:lvl2pPr marL="685800" indent="-228600"><a:defRPr sz="2400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl2pPr>
    </p:bodyStyle>
    <p:otherStyle>
      <a:lvl1pPr><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr>
    </p:otherStyle>
  </p:txStyles>
</p:sldMaster>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, layout_ids
    )
}

/// Master relationships: the layouts in order, then the theme
pub fn slide_master_relationships() -> Relationships {
    let mut rels = Relationships::new();
    for layout in SlideLayout::ALL {
        rels.add(
            format!("../slideLayouts/slideLayout{}.xml", layout_number(layout)),
            REL_TYPE_SLIDE_LAYOUT,
        );
    }
    rels.add("../theme/theme1.xml", REL_TYPE_THEME);
    rels
}

/// `ppt/slideLayouts/slideLayoutN.xml` with placeholders at the layout's frames
pub fn slide_layout_xml(layout: SlideLayout, slide_size: (i64, i64)) -> String {
    let frames = ShapeFrames::for_slide(layout, false, slide_size);
    let kind = LayoutKind::builtin_for(layout);
    let title_type = match layout {
        SlideLayout::Title | SlideLayout::ThankYou => "ctrTitle",
        _ => "title",
    };

    let mut shapes = placeholder_shape(2, "Title", &format!(r#"<p:ph type="{}"/>"#, title_type), frames.title);
    let mut next_id = 3;
    let mut push = |name: &str, ph: &str, frame: Frame| {
        shapes.push_str(&placeholder_shape(next_id, name, ph, frame));
        next_id += 1;
    };

    match layout {
        SlideLayout::Title | SlideLayout::ThankYou => {
            if let Some(frame) = frames.subtitle {
                push("Subtitle", r#"<p:ph type="subTitle" idx="1"/>"#, frame);
            }
        }
        SlideLayout::Subsection => {
            if let Some(frame) = frames.subtitle {
                push("Text", r#"<p:ph type="body" idx="1"/>"#, frame);
            }
        }
        SlideLayout::Content => {
            if let Some(frame) = frames.body {
                push("Content", r#"<p:ph idx="1"/>"#, frame);
            }
        }
        SlideLayout::TwoColumn => {
            if let Some((left, right)) = frames.columns {
                push("Left Content", r#"<p:ph sz="half" idx="1"/>"#, left);
                push("Right Content", r#"<p:ph sz="half" idx="2"/>"#, right);
            }
        }
        SlideLayout::Image => {
            push("Picture", r#"<p:ph type="pic" idx="1"/>"#, frames.picture);
        }
        SlideLayout::Quote => {}
    }

    format!(
        r#"{}
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">
  <p:cSld name="{}">
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
</p:sldLayout>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        kind.ooxml_type().unwrap_or("obj"),
        layout_name(layout),
        shapes
    )
}

fn placeholder_shape(id: u32, name: &str, placeholder: &str, frame: Frame) -> String {
    format!(
        r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{id}" name="{name} {id}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr>{placeholder}</p:nvPr>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p><a:endParaRPr lang="{lang}"/></a:p>
        </p:txBody>
      </p:sp>
"#,
        id = id,
        name = name,
        placeholder = placeholder,
        x = frame.x,
        y = frame.y,
        cx = frame.cx,
        cy = frame.cy,
        lang = DEFAULT_LOCALE,
    )
}

/// Layout relationships: the master
pub fn slide_layout_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("../slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER);
    rels
}

/// `docProps/app.xml` for a deck
pub fn app_xml(application: &str, slide_count: usize, slide_size: (i64, i64)) -> String {
    let format = if slide_size.0 * 9 == slide_size.1 * 16 {
        "Widescreen"
    } else if slide_size.0 * 3 == slide_size.1 * 4 {
        "On-screen Show (4:3)"
    } else {
        "Custom"
    };

    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Application>{}</Application>
  <PresentationFormat>{}</PresentationFormat>
  <Slides>{}</Slides>
  <Notes>0</Notes>
  <HiddenSlides>0</HiddenSlides>
  <ScaleCrop>false</ScaleCrop>
  <LinksUpToDate>false</LinksUpToDate>
  <SharedDoc>false</SharedDoc>
  <HyperlinksChanged>false</HyperlinksChanged>
</Properties>"#,
        XML_DECLARATION,
        escape_xml(application),
        format,
        slide_count
    )
}
