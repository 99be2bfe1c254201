use crate::domain::TranslationRequest;
use async_trait::async_trait;
use shared::Result;

/// Application-level translation operations
/// This is the read-through entry point callers use for every piece of content
#[async_trait]
pub trait TranslationOperations: Send + Sync + 'static {
    /// Returns the translation, or the original content when translation is
    /// skipped or fails. Only malformed input is reported as an error.
    async fn get_or_translate(&self, request: &TranslationRequest) -> Result<String>;
}
