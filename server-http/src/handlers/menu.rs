use crate::handlers::{ApiError, api_error};
use crate::models::{MenuTranslateRequest, MenuTranslateResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::ACCEPT_LANGUAGE},
};

/// POST /menu/translate
pub async fn translate_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MenuTranslateRequest>,
) -> Result<Json<MenuTranslateResponse>, ApiError> {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let language = state
        .languages
        .resolve(req.language.as_deref(), accept_language)
        .map_err(api_error)?;

    let titles = state
        .menu
        .translate_titles(req.titles.iter().map(String::as_str), &language);

    Ok(Json(MenuTranslateResponse {
        titles,
        language: language.to_string(),
    }))
}
