use async_trait::async_trait;
use lingua::Translator;
use reqwest::Client;
use serde::Deserialize;
use shared::{Error, Result};
use std::time::Duration;

/// Google Cloud Translation v2 client. The source language is detected by the provider.
#[derive(Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    fn first_translation(body: &str) -> Result<String> {
        let parsed: TranslateResponse = serde_json::from_str(body)
            .map_err(|e| Error::Translation(format!("Malformed provider response: {}", e)))?;
        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| Error::Translation("Provider returned no translations".into()))
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("q", text),
                ("target", target_language),
                ("format", "html"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Translation(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Translation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Translation(format!(
                "Provider responded with {}",
                status
            )));
        }

        Self::first_translation(&body)
    }
}

impl std::fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Stands in when no provider is configured. Every call fails, so callers
/// receive their original content back.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTranslator;

#[async_trait]
impl Translator for UnavailableTranslator {
    async fn translate(&self, _text: &str, _target_language: &str) -> Result<String> {
        Err(Error::Translation("no translation provider configured".into()))
    }
}
