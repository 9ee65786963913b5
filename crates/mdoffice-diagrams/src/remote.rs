//! Remote diagram rendering over HTTP
//!
//! The primary endpoint receives `POST {"code": "<source>"}` and answers with
//! image bytes. When it fails for any reason the renderer falls through to
//! an encoding-based endpoint, `GET <fallback_base>/img/<base64url(source)>`.
//! There are no retries beyond that single fallback and nothing is cached.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::renderer::DiagramRenderer;

/// Default primary rendering endpoint
pub const DEFAULT_PRIMARY_URL: &str = "https://kroki.io/mermaid/png";

/// Default base of the encoding-based fallback endpoint
pub const DEFAULT_FALLBACK_BASE: &str = "https://mermaid.ink";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoint configuration for [`RemoteRenderer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Whether fenced diagrams are rendered at all
    pub enabled: bool,
    /// Endpoint receiving the JSON POST
    pub primary_url: String,
    /// Base URL of the GET fallback
    pub fallback_base: String,
    /// Timeout applied to each request
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            fallback_base: DEFAULT_FALLBACK_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Renders diagrams through a primary endpoint and a GET fallback
#[derive(Debug, Clone)]
pub struct RemoteRenderer {
    primary_url: String,
    fallback_base: String,
    client: Client,
}

impl RemoteRenderer {
    /// Create a renderer for the given endpoints
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RenderError::Client(e.to_string()))?;

        Ok(Self {
            primary_url: config.primary_url.clone(),
            fallback_base: config.fallback_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a renderer for the public default endpoints
    pub fn with_defaults() -> Result<Self> {
        Self::new(&RendererConfig::default())
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    /// URL of the fallback GET for the given source
    pub fn fallback_url(&self, code: &str) -> String {
        format!("{}/img/{}", self.fallback_base, encode_source(code))
    }

    fn render_primary(&self, code: &str) -> Result<Vec<u8>> {
        let endpoint = self.primary_url.as_str();
        log::debug!("Rendering diagram via {}", endpoint);

        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .map_err(|source| RenderError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        read_image(endpoint, response)
    }

    fn render_fallback(&self, code: &str) -> Result<Vec<u8>> {
        let url = self.fallback_url(code);
        // The encoded source can be long; log only the base
        log::debug!("Rendering diagram via {}/img/", self.fallback_base);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| RenderError::Transport {
                endpoint: self.fallback_base.clone(),
                source,
            })?;

        read_image(&self.fallback_base, response)
    }
}

impl DiagramRenderer for RemoteRenderer {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn render(&self, code: &str) -> Result<Vec<u8>> {
        let primary = match self.render_primary(code) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => e,
        };
        log::warn!("Primary diagram endpoint failed, trying fallback: {}", primary);

        match self.render_fallback(code) {
            Ok(bytes) => Ok(bytes),
            Err(fallback) => {
                log::warn!("Fallback diagram endpoint failed: {}", fallback);
                Err(RenderError::AllEndpointsFailed {
                    primary: Box::new(primary),
                    fallback: Box::new(fallback),
                })
            }
        }
    }
}

fn read_image(endpoint: &str, response: reqwest::blocking::Response) -> Result<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(RenderError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().map_err(|source| RenderError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(RenderError::EmptyBody {
            endpoint: endpoint.to_string(),
        });
    }

    Ok(bytes.to_vec())
}

/// Encode diagram source for the fallback URL (base64url, unpadded)
pub fn encode_source(code: &str) -> String {
    URL_SAFE_NO_PAD.encode(code.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_source_is_url_safe() {
        let encoded = encode_source("graph TD; A-->B; B-->C?");
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(
            URL_SAFE_NO_PAD.decode(&encoded).unwrap(),
            b"graph TD; A-->B; B-->C?"
        );
    }

    #[test]
    fn test_fallback_url_trims_trailing_slash() {
        let config = RendererConfig {
            fallback_base: "https://render.example/".to_string(),
            ..Default::default()
        };
        let renderer = RemoteRenderer::new(&config).unwrap();
        let url = renderer.fallback_url("a");
        assert_eq!(url, format!("https://render.example/img/{}", encode_source("a")));
    }

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert!(config.enabled);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.primary_url, DEFAULT_PRIMARY_URL);
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config: RendererConfig = toml::from_str("timeout_secs = 3").unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.fallback_base, DEFAULT_FALLBACK_BASE);
    }
}
