use crate::handlers::{ApiError, api_error};
use crate::models::{TranslateRequest, TranslateResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::ACCEPT_LANGUAGE},
};
use lingua::{ContentType, TranslationRequest};
use tracing::debug;

/// POST /translate
///
/// Without an explicit target the language is negotiated from `Accept-Language`.
/// Provider failures are not errors: the original content comes back with
/// `translated: false`. A provider answer equal to the source still counts
/// as translated.
pub async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let to = state
        .languages
        .resolve(req.to.as_deref(), accept_language)
        .map_err(api_error)?;
    let from = state
        .languages
        .resolve(req.from.as_deref(), None)
        .map_err(api_error)?;
    let content_type: ContentType = req
        .content_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(api_error)?;

    debug!(
        "TRANSLATE: {} -> {}, type={}, {} bytes",
        from,
        to,
        content_type.as_str(),
        req.content.len()
    );

    let mut request = TranslationRequest::new(req.content, from.as_str(), to.as_str())
        .map_err(api_error)?
        .with_content_type(content_type)
        .with_tenant(state.tenant.clone());
    if let Some(post_id) = req.post_id {
        request = request.with_surrogate_id(post_id.to_string());
    }

    // One memo per HTTP request.
    let session = state.translation.session();
    let resolved = session.resolve(&request).await.map_err(api_error)?;

    Ok(Json(TranslateResponse {
        translated: resolved.is_translated(),
        content: resolved.content,
        language: to.to_string(),
    }))
}
