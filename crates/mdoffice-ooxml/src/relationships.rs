//! Relationship files (`_rels/*.rels`)
//!
//! OOXML parts reference each other through relationship ids. Every part
//! owns its own [`Relationships`]; ids are allocated sequentially after an
//! explicit number of reserved ids, so generated parts never depend on a
//! counter shared across the package.
//!
//! # Example
//!
//! ```
//! use mdoffice_ooxml::relationships::Relationships;
//!
//! // rId1 and rId2 are taken by styles and numbering
//! let mut rels = Relationships::with_reserved(2);
//! let id = rels.add("media/image1.png", Relationships::TYPE_IMAGE);
//! assert_eq!(id, "rId3");
//! ```

use std::collections::{HashMap, HashSet};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, XML_DECLARATION};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const TYPE_EXTENDED_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
}

/// Relationships of one part
///
/// Maintains insertion order for deterministic XML serialization.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Relationship ids in insertion order
    order: Vec<String>,
    map: HashMap<String, Relationship>,
    /// Numeric suffix of the next allocated id
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::with_reserved(0)
    }
}

/// A single relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    /// Target path, relative to the owning part's directory, or a URL
    pub target: String,
    pub rel_type: String,
    /// `External` for URLs, `None` for internal parts
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Create an empty relationship set allocating from `rId1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty relationship set whose first `reserved` ids are taken
    ///
    /// Reserved entries are registered with [`Relationships::insert`]; the
    /// first allocated id is `rId{reserved + 1}`.
    pub fn with_reserved(reserved: u32) -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: reserved + 1,
        }
    }

    /// Parse relationships from XML bytes
    ///
    /// New ids continue after the highest numeric id found.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = extract_id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            // Duplicates stay visible in `order` for validation
                            rels.order.push(id.clone());
                            rels.map.insert(
                                id.clone(),
                                Relationship {
                                    id,
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    /// Register an entry under an explicit id
    ///
    /// Used for reserved entries and for ids fixed by a template.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Result<()> {
        let id = id.into();
        if self.map.contains_key(&id) {
            return Err(OoxmlError::InvalidPackage(format!(
                "duplicate relationship id {}",
                id
            )));
        }
        if let Some(num) = extract_id_number(&id) {
            self.next_id_counter = self.next_id_counter.max(num + 1);
        }
        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            Relationship {
                id,
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode: None,
            },
        );
        Ok(())
    }

    /// Add a new relationship and return the generated id
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let target = target.into();
        let rel_type = rel_type.into();
        let target_mode = if rel_type == Self::TYPE_HYPERLINK && target.starts_with("http") {
            Some("External".to_string())
        } else {
            None
        };
        self.push_next(target, rel_type, target_mode)
    }

    fn push_next(&mut self, target: String, rel_type: String, target_mode: Option<String>) -> String {
        let id = format!("rId{}", self.next_id_counter);
        self.next_id_counter += 1;

        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            Relationship {
                id: id.clone(),
                target,
                rel_type,
                target_mode,
            },
        );
        id
    }

    /// Remove an entry
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let removed = self.map.remove(id)?;
        self.order.retain(|i| i != id);
        Some(removed)
    }

    /// Remove every entry matching the predicate, returning the removed entries
    pub fn remove_where<F: Fn(&Relationship) -> bool>(&mut self, predicate: F) -> Vec<Relationship> {
        let ids: Vec<String> = self
            .iter()
            .filter(|r| predicate(*r))
            .map(|r| r.id.clone())
            .collect();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.map.get(id)
    }

    /// First entry of the given type
    pub fn find_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.iter().find(|r| r.rel_type == rel_type)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.order.iter().filter_map(|id| self.map.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Numeric suffix the next allocated id will use
    pub fn next_id_number(&self) -> u32 {
        self.next_id_counter
    }

    /// Highest numeric id present, 0 when empty
    pub fn max_id_number(&self) -> u32 {
        self.order
            .iter()
            .filter_map(|id| extract_id_number(id))
            .max()
            .unwrap_or(0)
    }

    /// First id that occurs more than once
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.order
            .iter()
            .find(|id| !seen.insert(id.as_str()))
            .map(String::as_str)
    }

    /// Serialize relationships to OOXML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');

        for rel in self.iter() {
            xml.push_str("  <Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(&rel.id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
            }
            xml.push_str("/>\n");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Extract the numeric part from an id like `rId5`
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId").and_then(|n| n.parse().ok())
}

/// Path of the relationship file belonging to a part
///
/// `word/document.xml` → `word/_rels/document.xml.rels`, and the package
/// root (`""`) → `_rels/.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(i) => format!("{}/_rels/{}.rels", &part[..i], &part[i + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Target of `to` relative to the directory of the part `from`
///
/// `relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png")` is
/// `../media/image1.png`.
pub fn relative_target(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from.rfind('/') {
        Some(i) => from[..i].split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();
    let (to_dir, file) = to_parts.split_at(to_parts.len() - 1);

    let common = from_dir
        .iter()
        .zip(to_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
    segments.extend_from_slice(&to_dir[common..]);
    segments.extend_from_slice(file);
    segments.join("/")
}

/// Resolve a relative target against the directory of the part `from`
///
/// Absolute targets (leading `/`) are package-rooted.
pub fn resolve_target(from: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match from.rfind('/') {
        Some(i) => from[..i].split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
