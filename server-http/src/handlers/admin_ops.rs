use crate::handlers::{ApiError, api_error};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use lingua::CacheKey;
use lingua::CacheStatistics;
use lingua::domain::response::DeleteResponse;
use lingua::domain::response::admin::{ClearCacheResponse, CleanupResponse};
use tracing::info;

/// GET /admin/cache/stats
pub async fn cache_stats(
    State(state): State<AppState>,
) -> Result<Json<CacheStatistics>, ApiError> {
    info!("CACHE_STATS");
    state.admin.get_stats().await.map(Json).map_err(api_error)
}

/// POST /admin/cache/clear
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    info!("CLEAR_CACHE");
    state.admin.clear_cache().await.map(Json).map_err(api_error)
}

/// POST /admin/cache/cleanup
pub async fn clean_expired(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    info!("CLEAN_EXPIRED");
    state.admin.clean_expired().await.map(Json).map_err(api_error)
}

/// DELETE /admin/cache/entries/:key
pub async fn invalidate_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!("INVALIDATE: key={}", key);
    let key = CacheKey::parse(&key).map_err(api_error)?;
    state.admin.invalidate(&key).await.map(Json).map_err(api_error)
}
