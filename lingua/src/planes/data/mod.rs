pub mod memo;
pub mod operation;
pub mod translation_service;

pub use memo::RequestMemo;
pub use operation::TranslationOperations;
pub use translation_service::{Origin, Resolved, TranslationService, TranslationSession};
