//! Image assets awaiting binding into a package
//!
//! Projection never knows relationship ids. It registers image bytes in an
//! [`ImageSet`] under a generated placeholder id and emits that id into the
//! element model; the package assembler turns ids into relationships.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Prefix of generated placeholder ids
pub const PLACEHOLDER_PREFIX: &str = "img-";

/// Generate a fresh placeholder id
pub fn placeholder_id() -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, uuid::Uuid::new_v4().simple())
}

/// Raster formats the packages can embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect the format from magic bytes, defaulting to PNG
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            ImageFormat::Gif
        } else {
            ImageFormat::Png
        }
    }

    /// Extension used for the media part
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Parse a MIME subtype from a `data:` URI (`png`, `jpeg`, `jpg`, `gif`)
    pub fn from_mime_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }
}

/// A rendered or decoded image waiting to be embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub placeholder_id: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// 0-based insertion order within its set
    pub sequence_index: usize,
}

impl ImageAsset {
    pub fn format(&self) -> ImageFormat {
        ImageFormat::sniff(&self.bytes)
    }

    /// Pixel dimensions, when the header can be read
    ///
    /// PNG sizes come from the IHDR chunk, GIF sizes from the logical
    /// screen descriptor. JPEG returns `None`.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        let b = &self.bytes;
        match self.format() {
            ImageFormat::Png => {
                if b.len() < 24 || &b[12..16] != b"IHDR" {
                    return None;
                }
                let w = u32::from_be_bytes([b[16], b[17], b[18], b[19]]);
                let h = u32::from_be_bytes([b[20], b[21], b[22], b[23]]);
                (w > 0 && h > 0).then_some((w, h))
            }
            ImageFormat::Gif => {
                if b.len() < 10 {
                    return None;
                }
                let w = u16::from_le_bytes([b[6], b[7]]) as u32;
                let h = u16::from_le_bytes([b[8], b[9]]) as u32;
                (w > 0 && h > 0).then_some((w, h))
            }
            ImageFormat::Jpeg => None,
        }
    }
}

/// Images of one conversion, keyed by placeholder id
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    order: Vec<String>,
    assets: HashMap<String, ImageAsset>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a freshly generated placeholder id
    pub fn insert(&mut self, bytes: Vec<u8>) -> String {
        let id = placeholder_id();
        self.insert_with_id(id.clone(), bytes);
        id
    }

    /// Register bytes under a caller-chosen id, replacing any previous bytes
    pub fn insert_with_id(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        let id = id.into();
        if let Some(existing) = self.assets.get_mut(&id) {
            existing.bytes = bytes;
            return;
        }
        let asset = ImageAsset {
            placeholder_id: id.clone(),
            bytes,
            sequence_index: self.order.len(),
        };
        self.order.push(id.clone());
        self.assets.insert(id, asset);
    }

    pub fn get(&self, id: &str) -> Option<&ImageAsset> {
        self.assets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Assets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.order.iter().filter_map(|id| self.assets.get(id))
    }

    /// Placeholder ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Move every asset of `other` into this set
    pub fn extend(&mut self, other: ImageSet) {
        let ImageSet { order, mut assets } = other;
        for id in order {
            if let Some(asset) = assets.remove(&id) {
                self.insert_with_id(id, asset.bytes);
            }
        }
    }
}
