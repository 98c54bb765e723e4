//! API Handlers
//!
//! HTTP request handlers over the tiered cache service.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::ServiceStats;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, MgetRequest, MgetResponse, MsetRequest,
    MsetResponse, SetRequest, SetResponse,
};
use crate::service::CacheService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheService,
}

impl AppState {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    state.cache.set(&req.key, &req.value, req.ttl).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get_value(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
///
/// Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.delete(&key).await;

    Json(DeleteResponse::new(key))
}

/// Handler for POST /cache/mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MgetRequest>,
) -> Result<Json<MgetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let values = state.cache.mget::<Value, _>(req.keys.as_slice()).await;

    Ok(Json(MgetResponse { values }))
}

/// Handler for PUT /cache/mset
pub async fn mset_handler(
    State(state): State<AppState>,
    Json(req): Json<MsetRequest>,
) -> Result<Json<MsetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.mset(&req.items).await?;

    Ok(Json(MsetResponse::new(req.items.len())))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<ServiceStats> {
    Json(state.cache.stats().await)
}

/// Handler for GET /health
///
/// Always answers 200; an unreachable L2 only degrades the cache.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let l2_connected = state.cache.health_check().await;

    Json(HealthResponse::from_liveness(l2_connected))
}
