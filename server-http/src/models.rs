use serde::{Deserialize, Serialize};

// === Health ===

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub translator_available: bool,
    pub languages_available: bool,
}

// === Translation Models ===

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub content: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub post_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub content: String,
    pub translated: bool,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct MenuTranslateRequest {
    pub titles: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuTranslateResponse {
    pub titles: Vec<String>,
    pub language: String,
}

// === Errors ===

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
