//! # mdoffice-model
//!
//! Format-neutral data model for the mdoffice pipelines:
//!
//! - [`ElementDocument`] and [`Block`]: the projected form of a Markdown
//!   document, consumed by the Word serializer
//! - [`ImageSet`] and [`ImageAsset`]: images waiting to be bound to package
//!   relationships through placeholder ids
//! - [`Outline`] and [`SlideContent`]: the slide-deck form of a Markdown
//!   outline

pub mod block;
pub mod image;
pub mod slide;

pub use block::{Block, Cell, ElementDocument, Run};
pub use image::{placeholder_id, ImageAsset, ImageFormat, ImageSet, PLACEHOLDER_PREFIX};
pub use slide::{
    escape_literal, ContentLine, Outline, SlideContent, SlideLayout, UnknownLayout, MARKER_IMAGE,
    MARKER_LEVEL3, MARKER_QUOTE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
