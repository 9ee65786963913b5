//! Static parts of a fresh word-processing package

use crate::relationships::Relationships;
use crate::xml::{escape_xml, XML_DECLARATION};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Style ids referenced by the serializer
pub mod style_ids {
    pub const NORMAL: &str = "Normal";
    pub const HEADINGS: [&str; 3] = ["Heading1", "Heading2", "Heading3"];
    pub const QUOTE: &str = "Quote";
    pub const CODE: &str = "Code";
    pub const LIST_PARAGRAPH: &str = "ListParagraph";
    pub const CAPTION: &str = "Caption";
    pub const TABLE_GRID: &str = "TableGrid";
}

/// `word/styles.xml` defining every style the serializer uses
pub fn styles_xml() -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, W_NS));
    xml.push_str(
        r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );

    for (i, (size, color)) in [(32, "2F5496"), (26, "2F5496"), (24, "1F3763")]
        .iter()
        .enumerate()
    {
        let level = i + 1;
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{lvl}"/></w:pPr><w:rPr><w:b/><w:color w:val="{color}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
            level = level,
            lvl = i,
            color = color,
            size = size,
        ));
    }

    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="864" w:right="864"/><w:jc w:val="center"/></w:pPr><w:rPr><w:i/><w:color w:val="404040"/></w:rPr></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="Code"><w:name w:val="Code"/><w:basedOn w:val="Normal"/><w:pPr><w:shd w:val="clear" w:color="auto" w:fill="F2F2F2"/><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:rPr><w:rFonts w:ascii="Consolas" w:hAnsi="Consolas" w:cs="Consolas"/><w:sz w:val="20"/></w:rPr></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="720"/><w:contextualSpacing/></w:pPr></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:jc w:val="center"/></w:pPr><w:rPr><w:i/><w:sz w:val="18"/></w:rPr></w:style>"#,
    );
    xml.push_str(
        r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>"#,
    );
    xml.push_str("</w:styles>");
    xml
}

/// `word/numbering.xml`: numId 1 bullets, numId 2 decimal, nine levels each
pub fn numbering_xml() -> String {
    const BULLETS: [&str; 3] = ["\u{2022}", "o", "\u{25AA}"];

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, W_NS));

    xml.push_str(r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="hybridMultilevel"/>"#);
    for level in 0..9 {
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr></w:lvl>"#,
            level,
            BULLETS[level % BULLETS.len()],
            720 * (level + 1)
        ));
    }
    xml.push_str("</w:abstractNum>");

    xml.push_str(r#"<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="hybridMultilevel"/>"#);
    for level in 0..9 {
        let format = match level % 3 {
            0 => "decimal",
            1 => "lowerLetter",
            _ => "lowerRoman",
        };
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="{}"/><w:lvlText w:val="%{}."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr></w:lvl>"#,
            level,
            format,
            level + 1,
            720 * (level + 1)
        ));
    }
    xml.push_str("</w:abstractNum>");

    xml.push_str(r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#);
    xml.push_str(r#"<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>"#);
    xml.push_str("</w:numbering>");
    xml
}

/// `docProps/core.xml`
pub fn core_xml(title: &str, creator: &str) -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{}</dc:title>
  <dc:creator>{}</dc:creator>
</cp:coreProperties>"#,
        XML_DECLARATION,
        escape_xml(title),
        escape_xml(creator)
    )
}

/// `docProps/app.xml`
pub fn app_xml(application: &str) -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <Application>{}</Application>
</Properties>"#,
        XML_DECLARATION,
        escape_xml(application)
    )
}

/// Package relationships pointing at the main part and the properties
pub fn root_relationships(main_part: &str) -> Relationships {
    let mut rels = Relationships::new();
    rels.add(main_part, Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
    rels.add("docProps/app.xml", Relationships::TYPE_EXTENDED_PROPERTIES);
    rels
}
