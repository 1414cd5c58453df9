#![doc = include_str!("../README.md")]

use catalog_sync::{TranslateError, Translator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("catalog-sync/", env!("CARGO_PKG_VERSION"));

/// Settings for [`LibreTranslateClient`].
#[derive(Clone, Debug)]
pub struct LibreTranslateConfig {
    /// Full URL of the `/translate` endpoint.
    pub endpoint: String,
    /// Language tag the texts are written in.
    pub source_language: String,
    /// API key, if the instance requires one.
    pub api_key: Option<String>,
    /// Timeout for a whole request, connection included.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Translates texts through a LibreTranslate-compatible API.
#[derive(Clone, Debug)]
pub struct LibreTranslateClient {
    client: Client,
    config: LibreTranslateConfig,
    source: String,
}

impl LibreTranslateClient {
    /// Builds the client. Fails only if the HTTP stack cannot be initialised.
    pub fn new(config: LibreTranslateConfig) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| TranslateError::Transport(format!("http client build failed: {}", err)))?;
        let source = provider_language(&config.source_language);
        Ok(Self {
            client,
            config,
            source,
        })
    }
}

impl Translator for LibreTranslateClient {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let target = provider_language(target_language);
        let body = TranslateRequest {
            q: text,
            source: &self.source,
            target: &target,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        tracing::debug!("POST {} ({} -> {})", self.config.endpoint, self.source, target);
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .map_err(|err| TranslateError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .map(|body| body.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(TranslateError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .map_err(|err| TranslateError::MalformedResponse(err.to_string()))?;
        Ok(parsed.translated_text)
    }
}

/// Maps a catalog language tag to the code LibreTranslate expects.
///
/// LibreTranslate keys languages by their primary subtag, except for
/// Traditional Chinese which it calls `zt`.
pub fn provider_language(tag: &str) -> String {
    let mut parts = tag.split(['-', '_']);
    let primary = parts.next().unwrap_or(tag).to_ascii_lowercase();
    if primary == "zh" && parts.any(|p| p.eq_ignore_ascii_case("hant") || p.eq_ignore_ascii_case("tw")) {
        return "zt".to_string();
    }
    primary
}
