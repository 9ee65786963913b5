//! The conversion engine
//!
//! An [`Engine`] holds configuration and an optional diagram renderer and
//! shares no mutable state between calls, so one instance can serve
//! concurrent conversions.

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mdoffice_core::{decode_utf8, parse_outline, project, render_outline_diagrams};
use mdoffice_diagrams::{DiagramRenderer, NoopRenderer, RemoteRenderer};
use mdoffice_ooxml::DocxWriter;
use mdoffice_pptx::{DeckStyle, PptxTemplate, PptxWriter};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Template extensions tried for a named deck template, in order
const DECK_TEMPLATE_EXTENSIONS: [&str; 2] = ["pptx", "potx"];

/// Which template a deck is built on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSelector {
    /// Generated masters and layouts
    #[default]
    Builtin,
    /// `<templates.dir>/<name>.pptx` or `.potx`
    Named(String),
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Options of one deck conversion
#[derive(Debug, Clone, Default)]
pub struct DeckOptions {
    pub template: TemplateSelector,
    pub style: DeckStyle,
}

impl DeckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: TemplateSelector) -> Self {
        self.template = template;
        self
    }

    pub fn with_style(mut self, style: DeckStyle) -> Self {
        self.style = style;
        self
    }
}

/// Cooperative cancellation flag, checked between pipeline stages
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            log::debug!("Conversion cancelled before {}", stage);
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}

/// Converts Markdown to Word documents and slide decks
pub struct Engine {
    config: EngineConfig,
    renderer: Option<Box<dyn DiagramRenderer>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name()))
            .finish()
    }
}

impl Engine {
    /// Engine with a remote renderer, unless diagrams are disabled
    pub fn new(config: EngineConfig) -> Result<Self> {
        let renderer: Option<Box<dyn DiagramRenderer>> = if config.diagrams.enabled {
            Some(Box::new(RemoteRenderer::new(&config.diagrams)?))
        } else {
            log::debug!("Diagram rendering disabled");
            None
        };
        Ok(Self { config, renderer })
    }

    /// Engine that never renders diagrams
    pub fn offline(config: EngineConfig) -> Self {
        Self {
            config,
            renderer: None,
        }
    }

    /// Replace the diagram renderer
    pub fn with_renderer(mut self, renderer: impl DiagramRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render Markdown to a `.docx` byte stream
    pub fn render_docx(&self, markdown: &str, file_name: &str) -> Result<Vec<u8>> {
        self.render_docx_cancellable(markdown, file_name, &CancelToken::new())
    }

    /// Render UTF-8 Markdown bytes to a `.docx` byte stream
    pub fn render_docx_bytes(&self, markdown: &[u8], file_name: &str) -> Result<Vec<u8>> {
        self.render_docx(decode_utf8(markdown)?, file_name)
    }

    /// Render Markdown read from `reader` to a `.docx` byte stream
    pub fn render_docx_from_reader<R: Read>(&self, mut reader: R, file_name: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.render_docx_bytes(&bytes, file_name)
    }

    pub fn render_docx_cancellable(
        &self,
        markdown: &str,
        file_name: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>> {
        cancel.check("projection")?;
        let projection = project(markdown, self.renderer.as_deref());
        log::debug!(
            "Projected {} blocks and {} images for {}",
            projection.document.blocks.len(),
            projection.images.len(),
            file_name
        );

        cancel.check("packaging")?;
        let mut writer = DocxWriter::new().with_file_name(file_name);
        if let Some(template) = &self.config.docx.template {
            let path = self.config.templates.resolve(template);
            writer = writer.with_template(DocxWriter::load_template(path)?);
        }
        let bytes = writer.generate(&projection.document, &projection.images)?;

        cancel.check("delivery")?;
        log::info!("Rendered {} ({} bytes)", file_name, bytes.len());
        Ok(bytes)
    }

    /// Render a Markdown outline to a `.pptx` byte stream
    pub fn render_pptx(&self, markdown: &str, file_name: &str, options: &DeckOptions) -> Result<Vec<u8>> {
        self.render_pptx_cancellable(markdown, file_name, options, &CancelToken::new())
    }

    pub fn render_pptx_cancellable(
        &self,
        markdown: &str,
        file_name: &str,
        options: &DeckOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>> {
        cancel.check("outline parsing")?;
        let mut outline = parse_outline(markdown);

        cancel.check("diagram rendering")?;
        let images = match self.renderer.as_deref() {
            Some(renderer) => render_outline_diagrams(&mut outline, renderer),
            None => render_outline_diagrams(&mut outline, &NoopRenderer),
        };
        log::debug!(
            "Outline of {} slides with {} rendered diagrams for {}",
            outline.len(),
            images.len(),
            file_name
        );

        cancel.check("packaging")?;
        let style = self.deck_style(&options.style);
        let mut writer = PptxWriter::new().with_file_name(file_name);
        if let Some(template) = self.load_deck_template(&options.template, &style)? {
            writer = writer.with_template(template);
        }
        let bytes = writer.with_style(style).generate(&outline, &images)?;

        cancel.check("delivery")?;
        log::info!("Rendered {} ({} bytes)", file_name, bytes.len());
        Ok(bytes)
    }

    /// Deck style with the configured locale filled in
    fn deck_style(&self, style: &DeckStyle) -> DeckStyle {
        match &self.config.deck.locale {
            Some(locale) if style.property("locale").is_none() => {
                style.clone().with_property("locale", locale.clone())
            }
            _ => style.clone(),
        }
    }

    fn load_deck_template(&self, selector: &TemplateSelector, style: &DeckStyle) -> Result<Option<PptxTemplate>> {
        let template = match selector {
            TemplateSelector::Builtin => match style.template() {
                Some(name) => Some(PptxTemplate::from_file(self.find_deck_template(name)?)?),
                None => None,
            },
            TemplateSelector::Named(name) => Some(PptxTemplate::from_file(self.find_deck_template(name)?)?),
            TemplateSelector::Path(path) => Some(PptxTemplate::from_file(path)?),
            TemplateSelector::Bytes(bytes) => Some(PptxTemplate::from_bytes(bytes)?),
        };
        Ok(template)
    }

    /// Resolve a template name inside the template directory
    pub fn find_deck_template(&self, name: &str) -> Result<PathBuf> {
        let dir = &self.config.templates.dir;
        let exact = dir.join(name);
        if exact.extension().is_some() && exact.is_file() {
            return Ok(exact);
        }
        DECK_TEMPLATE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| EngineError::UnknownTemplate(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_sync() {
        assert_send_sync::<Engine>();
        assert_send_sync::<CancelToken>();
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check("test"), Err(EngineError::Cancelled)));
    }

    #[test]
    fn test_disabled_diagrams_have_no_renderer() {
        let mut config = EngineConfig::default();
        config.diagrams.enabled = false;
        let engine = Engine::new(config).unwrap();
        assert!(format!("{:?}", engine).contains("renderer: None"));
    }

    #[test]
    fn test_deck_style_locale_from_config() {
        let mut config = EngineConfig::default();
        config.deck.locale = Some("de-DE".to_string());
        let engine = Engine::offline(config);

        assert_eq!(engine.deck_style(&DeckStyle::new()).locale(), "de-DE");
        let explicit = DeckStyle::new().with_property("locale", "it-IT");
        assert_eq!(engine.deck_style(&explicit).locale(), "it-IT");
    }

    #[test]
    fn test_unknown_named_template() {
        let mut config = EngineConfig::default();
        config.templates.dir = PathBuf::from("/nonexistent/templates");
        let engine = Engine::offline(config);
        assert!(matches!(
            engine.find_deck_template("corporate"),
            Err(EngineError::UnknownTemplate(name)) if name == "corporate"
        ));
    }
}
