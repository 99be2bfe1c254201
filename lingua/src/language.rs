//! Language capability: whether a multilingual site plugin is present, and
//! which languages it knows. Probed once at startup.

use shared::Result;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::LanguageCode;
use crate::ports::LanguageProvider;

/// Language provider backed by a fixed list from configuration.
#[derive(Debug, Clone)]
pub struct StaticLanguageProvider {
    default: LanguageCode,
    supported: Vec<LanguageCode>,
}

impl StaticLanguageProvider {
    /// The default language is always treated as supported.
    pub fn new(default: &str, supported: &[String]) -> Result<Self> {
        let default = LanguageCode::new(default)?;
        let mut languages = Vec::with_capacity(supported.len() + 1);
        languages.push(default.clone());
        for code in supported {
            let code = LanguageCode::new(code)?;
            if !languages.contains(&code) {
                languages.push(code);
            }
        }
        Ok(Self {
            default,
            supported: languages,
        })
    }
}

impl LanguageProvider for StaticLanguageProvider {
    fn default_language(&self) -> LanguageCode {
        self.default.clone()
    }

    fn supported_languages(&self) -> Vec<LanguageCode> {
        self.supported.clone()
    }

    fn negotiate(&self, accept_language: &str) -> LanguageCode {
        let first = accept_language
            .split(',')
            .next()
            .and_then(|entry| entry.split(';').next())
            .map(str::trim)
            .unwrap_or_default();
        let primary = first.split(['-', '_']).next().unwrap_or_default();

        self.supported
            .iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(first))
            .or_else(|| {
                self.supported
                    .iter()
                    .find(|code| !primary.is_empty() && code.as_str().eq_ignore_ascii_case(primary))
            })
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[derive(Clone)]
pub enum LanguageCapability {
    Available(Arc<dyn LanguageProvider>),
    Unavailable,
}

impl LanguageCapability {
    pub fn probe(provider: Option<Arc<dyn LanguageProvider>>) -> Self {
        match provider {
            Some(provider) => {
                let languages: Vec<String> = provider
                    .supported_languages()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                info!(
                    "Language provider available: default={}, languages=[{}]",
                    provider.default_language(),
                    languages.join(", ")
                );
                LanguageCapability::Available(provider)
            }
            None => {
                warn!("No language provider configured, using '{}'", LanguageCode::fallback());
                LanguageCapability::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LanguageCapability::Available(_))
    }

    pub fn default_language(&self) -> LanguageCode {
        match self {
            LanguageCapability::Available(provider) => provider.default_language(),
            LanguageCapability::Unavailable => LanguageCode::fallback(),
        }
    }

    /// An explicit request wins; then the browser preference; then the default.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        accept_language: Option<&str>,
    ) -> Result<LanguageCode> {
        if let Some(requested) = requested {
            return LanguageCode::new(requested);
        }
        match (self, accept_language) {
            (LanguageCapability::Available(provider), Some(header)) => Ok(provider.negotiate(header)),
            _ => Ok(self.default_language()),
        }
    }
}

impl fmt::Debug for LanguageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageCapability::Available(provider) => f
                .debug_tuple("Available")
                .field(&provider.default_language())
                .finish(),
            LanguageCapability::Unavailable => f.write_str("Unavailable"),
        }
    }
}
