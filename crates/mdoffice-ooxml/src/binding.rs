//! Placeholder-token resolution for embedded images
//!
//! Serializers cannot know relationship ids while they emit XML, so every
//! image reference is written as a token `mdoffice-image:<placeholder id>`.
//! [`MediaBinder`] walks the generated parts in package order, replaces each
//! token by a relationship id of the owning part and stores each image once
//! under `<media root>/media/imageN.<ext>`.

use std::collections::HashMap;

use mdoffice_model::ImageSet;

use crate::content_types::ContentTypes;
use crate::error::{OoxmlError, Result};
use crate::package::Package;
use crate::relationships::{relative_target, Relationships};

/// Scheme prefix of image placeholder tokens
pub const PLACEHOLDER_SCHEME: &str = "mdoffice-image:";

/// Token written in place of a relationship id
pub fn placeholder_token(placeholder_id: &str) -> String {
    format!("{}{}", PLACEHOLDER_SCHEME, placeholder_id)
}

/// Placeholder ids referenced by a fragment, in first-occurrence order
pub fn referenced_placeholders(xml: &str) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::new();
    for (_, id) in token_spans(xml) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Attribute whose value carries a token; run text is never rewritten
const EMBED_ATTRIBUTE: &str = "r:embed=\"";

/// `(token start, placeholder id)` for every token held by an `r:embed` value
fn token_spans(xml: &str) -> Vec<(usize, &str)> {
    let needle = format!("{}{}", EMBED_ATTRIBUTE, PLACEHOLDER_SCHEME);
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(pos) = xml[from..].find(needle.as_str()) {
        let start = from + pos + EMBED_ATTRIBUTE.len();
        let id_start = start + PLACEHOLDER_SCHEME.len();
        let id_len = xml[id_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(xml.len() - id_start);
        spans.push((start, &xml[id_start..id_start + id_len]));
        from = id_start + id_len;
    }
    spans
}

/// Binds image placeholders of one package
#[derive(Debug)]
pub struct MediaBinder<'a> {
    images: &'a ImageSet,
    /// Directory holding `media/`, e.g. `word` or `ppt`
    media_root: String,
    /// Package path of each bound asset
    media_paths: HashMap<String, String>,
    /// Bound asset ids in binding order
    bound: Vec<String>,
    next_index: usize,
}

impl<'a> MediaBinder<'a> {
    pub fn new(images: &'a ImageSet, media_root: impl Into<String>) -> Self {
        Self {
            images,
            media_root: media_root.into().trim_end_matches('/').to_string(),
            media_paths: HashMap::new(),
            bound: Vec::new(),
            next_index: 1,
        }
    }

    /// Skip media names already present in a template package
    pub fn avoid_existing(mut self, package: &Package) -> Self {
        let prefix = format!("{}/media/image", self.media_root);
        let highest = package
            .paths()
            .filter_map(|p| p.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split('.').next())
            .filter_map(|n| n.parse::<usize>().ok())
            .max();
        if let Some(highest) = highest {
            self.next_index = self.next_index.max(highest + 1);
        }
        self
    }

    /// Replace every token in the XML of `part_path`
    ///
    /// Each distinct asset referenced by the part gets exactly one image
    /// relationship in `rels`, allocated in first-reference order.
    pub fn bind_part(&mut self, part_path: &str, xml: &str, rels: &mut Relationships) -> Result<String> {
        let spans = token_spans(xml);
        if spans.is_empty() {
            return Ok(xml.to_string());
        }

        let mut rel_ids: HashMap<&str, String> = HashMap::new();
        let mut out = String::with_capacity(xml.len());
        let mut last = 0;

        for (start, id) in spans {
            if !rel_ids.contains_key(id) {
                let media_path = self.media_path(id)?;
                let rel_id = rels.add(
                    relative_target(part_path, &media_path),
                    Relationships::TYPE_IMAGE,
                );
                log::debug!("Bound image {} in {} as {}", id, part_path, rel_id);
                rel_ids.insert(id, rel_id);
            }
            out.push_str(&xml[last..start]);
            out.push_str(&rel_ids[id]);
            last = start + PLACEHOLDER_SCHEME.len() + id.len();
        }
        out.push_str(&xml[last..]);
        Ok(out)
    }

    /// Media path of an asset, assigning the next global index on first use
    fn media_path(&mut self, id: &str) -> Result<String> {
        if let Some(path) = self.media_paths.get(id) {
            return Ok(path.clone());
        }
        let asset = self
            .images
            .get(id)
            .ok_or_else(|| OoxmlError::DanglingImage(id.to_string()))?;
        let path = format!(
            "{}/media/image{}.{}",
            self.media_root,
            self.next_index,
            asset.format().extension()
        );
        self.next_index += 1;
        self.media_paths.insert(id.to_string(), path.clone());
        self.bound.push(id.to_string());
        Ok(path)
    }

    /// Write media files and declare their extensions
    ///
    /// Fails if any asset of the set was never referenced.
    pub fn finish(self, package: &mut Package, content_types: &mut ContentTypes) -> Result<usize> {
        if let Some(orphan) = self.images.ids().find(|id| !self.media_paths.contains_key(*id)) {
            return Err(OoxmlError::OrphanImage(orphan.to_string()));
        }

        for id in &self.bound {
            if let Some(asset) = self.images.get(id) {
                let format = asset.format();
                content_types.add_default(format.extension(), format.content_type());
                package.set(self.media_paths[id].clone(), asset.bytes.clone());
            }
        }
        Ok(self.bound.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n....";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    fn blip(id: &str) -> String {
        format!(r#"<a:blip r:embed="{}"/>"#, placeholder_token(id))
    }

    #[test]
    fn test_token_scanning() {
        let xml = format!("{}{}{}", blip("img-a"), blip("img-b"), blip("img-a"));
        assert_eq!(referenced_placeholders(&xml), vec!["img-a", "img-b"]);
        assert!(referenced_placeholders("<w:p/>").is_empty());
    }

    #[test]
    fn test_scheme_in_run_text_is_left_alone() {
        let images = ImageSet::new();
        let mut binder = MediaBinder::new(&images, "word");
        let mut rels = Relationships::new();

        let xml = format!("<w:t>see {}</w:t>", placeholder_token("logo"));
        assert!(referenced_placeholders(&xml).is_empty());
        let bound = binder.bind_part("word/document.xml", &xml, &mut rels).unwrap();
        assert_eq!(bound, xml);
        assert!(rels.is_empty());
    }

    #[test]
    fn test_one_relationship_per_asset_and_part() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-a", PNG.to_vec());
        images.insert_with_id("img-b", JPEG.to_vec());

        let mut package = Package::new();
        let mut types = ContentTypes::standard();
        let mut binder = MediaBinder::new(&images, "word");

        let mut rels = Relationships::with_reserved(2);
        let xml = format!("{}{}{}", blip("img-b"), blip("img-a"), blip("img-b"));
        let bound = binder.bind_part("word/document.xml", &xml, &mut rels).unwrap();

        assert_eq!(
            bound,
            r#"<a:blip r:embed="rId3"/><a:blip r:embed="rId4"/><a:blip r:embed="rId3"/>"#
        );
        assert_eq!(rels.get("rId3").unwrap().target, "media/image1.jpeg");
        assert_eq!(rels.get("rId4").unwrap().target, "media/image2.png");

        assert_eq!(binder.finish(&mut package, &mut types).unwrap(), 2);
        assert!(package.contains("word/media/image1.jpeg"));
        assert!(package.contains("word/media/image2.png"));
        assert_eq!(types.default_for("png"), Some("image/png"));
        assert_eq!(types.default_for("jpeg"), Some("image/jpeg"));
    }

    #[test]
    fn test_shared_asset_across_parts_is_stored_once() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-a", PNG.to_vec());

        let mut binder = MediaBinder::new(&images, "ppt");
        let mut rels1 = Relationships::with_reserved(1);
        let mut rels2 = Relationships::with_reserved(1);
        binder
            .bind_part("ppt/slides/slide1.xml", &blip("img-a"), &mut rels1)
            .unwrap();
        binder
            .bind_part("ppt/slides/slide2.xml", &blip("img-a"), &mut rels2)
            .unwrap();

        assert_eq!(rels1.get("rId2").unwrap().target, "../media/image1.png");
        assert_eq!(rels2.get("rId2").unwrap().target, "../media/image1.png");

        let mut package = Package::new();
        let mut types = ContentTypes::standard();
        binder.finish(&mut package, &mut types).unwrap();
        assert_eq!(package.len(), 1);
    }

    #[test]
    fn test_dangling_reference_fails() {
        let images = ImageSet::new();
        let mut binder = MediaBinder::new(&images, "word");
        let mut rels = Relationships::new();
        let err = binder
            .bind_part("word/document.xml", &blip("img-missing"), &mut rels)
            .unwrap_err();
        assert!(matches!(err, OoxmlError::DanglingImage(id) if id == "img-missing"));
    }

    #[test]
    fn test_orphan_asset_fails() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-unused", PNG.to_vec());
        let binder = MediaBinder::new(&images, "word");

        let mut package = Package::new();
        let mut types = ContentTypes::standard();
        let err = binder.finish(&mut package, &mut types).unwrap_err();
        assert!(matches!(err, OoxmlError::OrphanImage(id) if id == "img-unused"));
        assert!(package.is_empty());
    }

    #[test]
    fn test_avoid_existing_template_media() {
        let mut images = ImageSet::new();
        images.insert_with_id("img-a", PNG.to_vec());

        let mut template = Package::new();
        template.set("ppt/media/image1.png", Vec::new());
        template.set("ppt/media/image4.jpeg", Vec::new());

        let mut binder = MediaBinder::new(&images, "ppt").avoid_existing(&template);
        let mut rels = Relationships::new();
        binder
            .bind_part("ppt/slides/slide1.xml", &blip("img-a"), &mut rels)
            .unwrap();
        assert_eq!(rels.get("rId1").unwrap().target, "../media/image5.png");
    }
}
