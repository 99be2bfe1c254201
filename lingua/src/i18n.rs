//! Menu translation tables, built once at startup and shared read-only.

use serde::Deserialize;
use shared::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::domain::LanguageCode;

/// Menu title replaced by the display name of the current language.
pub const LANGUAGE_PLACEHOLDER: &str = "#LANGUAGE#";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MenuCatalog {
    /// language code -> display name, e.g. `ru` -> `🇷🇺 Русский`
    #[serde(default)]
    language_names: HashMap<String, String>,
    /// language code -> (source title -> translated title)
    #[serde(default)]
    dictionaries: HashMap<String, HashMap<String, String>>,
}

impl MenuCatalog {
    pub fn builder() -> MenuCatalogBuilder {
        MenuCatalogBuilder::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidInput(format!("invalid menu catalog: {}", e)))?;
        Ok(catalog.with_lowercase_languages())
    }

    /// Language codes are matched lowercased, like `LanguageCode`.
    fn with_lowercase_languages(self) -> Self {
        Self {
            language_names: self
                .language_names
                .into_iter()
                .map(|(code, name)| (code.to_ascii_lowercase(), name))
                .collect(),
            dictionaries: self
                .dictionaries
                .into_iter()
                .map(|(code, dictionary)| (code.to_ascii_lowercase(), dictionary))
                .collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Storage(format!(
                "Failed to read menu catalog {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn language_name(&self, language: &LanguageCode) -> Option<&str> {
        self.language_names.get(language.as_str()).map(String::as_str)
    }

    pub fn translate_title(&self, title: &str, language: &LanguageCode) -> String {
        if title.trim() == LANGUAGE_PLACEHOLDER {
            return self
                .language_name(language)
                .unwrap_or(language.as_str())
                .to_string();
        }

        let Some(dictionary) = self.dictionaries.get(language.as_str()) else {
            return title.to_string();
        };
        let lookup = |text: &str| {
            dictionary
                .get(text)
                .filter(|translated| !translated.is_empty())
                .cloned()
        };

        if let Some(translated) = lookup(title) {
            return translated;
        }
        // Decorated titles such as "🚀 Launch" share the plain title's entry.
        match leading_emoji(title) {
            Some((emoji, rest)) => lookup(rest)
                .map(|translated| format!("{} {}", emoji, translated))
                .unwrap_or_else(|| title.to_string()),
            None => title.to_string(),
        }
    }

    pub fn translate_titles<'a, I>(&self, titles: I, language: &LanguageCode) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        titles
            .into_iter()
            .map(|title| self.translate_title(title, language))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MenuCatalogBuilder {
    catalog: MenuCatalog,
}

impl MenuCatalogBuilder {
    pub fn language_name(mut self, language: &str, name: &str) -> Self {
        self.catalog
            .language_names
            .insert(language.to_ascii_lowercase(), name.to_string());
        self
    }

    pub fn entry(mut self, language: &str, title: &str, translated: &str) -> Self {
        self.catalog
            .dictionaries
            .entry(language.to_ascii_lowercase())
            .or_default()
            .insert(title.to_string(), translated.to_string());
        self
    }

    pub fn build(self) -> MenuCatalog {
        self.catalog
    }
}

fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F700..=0x1F77F
            | 0x1F780..=0x1F7FF
            | 0x1F800..=0x1F8FF
            | 0x1F900..=0x1F9FF
            | 0x1FA00..=0x1FA6F
            | 0x1FA70..=0x1FAFF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
    )
}

/// Splits a decorative emoji off the start of a menu title.
pub fn leading_emoji(title: &str) -> Option<(char, &str)> {
    let trimmed = title.trim_start();
    let first = trimmed.chars().next().filter(|c| is_pictographic(*c))?;
    let rest = trimmed[first.len_utf8()..].trim_start_matches(['\u{fe0f}', ' ']);
    Some((first, rest))
}
