pub mod admin_ops;
pub mod health;
pub mod menu;
pub mod translate_ops;

pub use admin_ops::{cache_stats, clean_expired, clear_cache, invalidate_entry};
pub use health::health_check;
pub use menu::translate_menu;
pub use translate_ops::translate;

use crate::models::ErrorResponse;
use axum::{Json, http::StatusCode};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(err: shared::Error) -> ApiError {
    let status = match &err {
        shared::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        shared::Error::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
