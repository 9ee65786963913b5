//! In-memory OOXML package
//!
//! A `.docx` or `.pptx` file is a ZIP archive of parts. [`Package`] keeps the
//! parts in insertion order so that the written archive is deterministic,
//! with `[Content_Types].xml` always stored first.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::Result;

/// Path of the content-type manifest
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Ordered mapping of part path to bytes
#[derive(Debug, Clone, Default)]
pub struct Package {
    order: Vec<String>,
    parts: HashMap<String, Vec<u8>>,
}

impl Package {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Package::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            package.set(name, contents);
        }

        Ok(package)
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(|v| v.as_slice())
    }

    /// Get a part's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Part paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Set or replace a part; a replaced part keeps its position
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        let path = path.into();
        if !self.parts.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.parts.insert(path, contents);
    }

    /// Set a part from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Remove a part
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        let removed = self.parts.remove(path);
        if removed.is_some() {
            self.order.retain(|p| p != path);
        }
        removed
    }

    /// Remove every part matching the predicate, returning the removed paths
    pub fn remove_matching<F: Fn(&str) -> bool>(&mut self, predicate: F) -> Vec<String> {
        let removed: Vec<String> = self
            .order
            .iter()
            .filter(|p| predicate(p))
            .cloned()
            .collect();
        for path in &removed {
            self.parts.remove(path);
        }
        self.order.retain(|p| !removed.contains(p));
        removed
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let manifest = self.order.iter().filter(|p| *p == CONTENT_TYPES_PART);
        let rest = self.order.iter().filter(|p| *p != CONTENT_TYPES_PART);
        for path in manifest.chain(rest) {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&self.parts[path])?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to a complete ZIP byte buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_operations() {
        let mut package = Package::new();
        package.set_string("a.xml", "<a/>");
        package.set_string("b.xml", "<b/>");
        package.set_string("a.xml", "<a2/>");

        assert_eq!(package.paths().collect::<Vec<_>>(), vec!["a.xml", "b.xml"]);
        assert_eq!(package.get_string("a.xml").as_deref(), Some("<a2/>"));

        package.remove("a.xml");
        assert!(!package.contains("a.xml"));
        assert_eq!(package.len(), 1);
    }

    #[test]
    fn test_remove_matching() {
        let mut package = Package::new();
        package.set_string("ppt/slides/slide1.xml", "");
        package.set_string("ppt/slides/_rels/slide1.xml.rels", "");
        package.set_string("ppt/presentation.xml", "");

        let removed = package.remove_matching(|p| p.starts_with("ppt/slides/"));
        assert_eq!(removed.len(), 2);
        assert_eq!(package.paths().collect::<Vec<_>>(), vec!["ppt/presentation.xml"]);
    }

    #[test]
    fn test_zip_roundtrip_puts_manifest_first() {
        let mut package = Package::new();
        package.set_string("word/document.xml", "<w:document/>");
        package.set_string(CONTENT_TYPES_PART, "<Types/>");

        let bytes = package.to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), CONTENT_TYPES_PART);

        let reopened = Package::from_bytes(&bytes).unwrap();
        assert_eq!(
            reopened.get_string("word/document.xml").as_deref(),
            Some("<w:document/>")
        );
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");

        let mut package = Package::new();
        package.set_string("x.xml", "<x/>");
        package.write_to_file(&path).unwrap();

        let reopened = Package::open(&path).unwrap();
        assert!(reopened.contains("x.xml"));
    }

    #[test]
    fn test_invalid_archive_is_an_error() {
        assert!(Package::from_bytes(b"not a zip").is_err());
    }
}
