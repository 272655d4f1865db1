//! HTTP routes for the key management API.
//!
//! | Method & path | Operation |
//! |---------------|-----------|
//! | `POST /api/v1/keys` | create (201) |
//! | `GET /api/v1/keys/by-value/:value` | public search |
//! | `GET /api/v1/owners/:owner_id/keys` | list for owner |
//! | `GET /api/v1/owners/:owner_id/keys/:key_id` | internal search |
//! | `DELETE /api/v1/owners/:owner_id/keys/:key_id` | delete |
//! | `GET /health` | liveness |

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pk_01_key_lifecycle::{
    CreateKeyRequest, CreatedKey, InternalKeyDetails, KeyDetails, KeyManagementApi, OwnerKeys,
};
use serde::Serialize;
use shared_types::KeyId;
use std::sync::Arc;
use tracing::debug;

use crate::domain::error::{ApiError, ApiResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn KeyManagementApi>,
}

/// Routes without middleware.
pub fn build_router(api: Arc<dyn KeyManagementApi>) -> Router {
    Router::new()
        .route("/api/v1/keys", post(create_key))
        .route("/api/v1/keys/by-value/:value", get(search_key))
        .route("/api/v1/owners/:owner_id/keys", get(list_keys))
        .route(
            "/api/v1/owners/:owner_id/keys/:key_id",
            get(internal_search_key).delete(delete_key),
        )
        .route("/health", get(health_check))
        .with_state(AppState { api })
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedKey {
    pub deleted_key_id: KeyId,
}

fn owner_key_path(
    path: Result<Path<(String, KeyId)>, PathRejection>,
) -> ApiResult<(String, KeyId)> {
    path.map(|Path(parts)| parts).map_err(|e| {
        debug!(error = %e, "Rejected key path");
        ApiError::invalid_argument("invalid arguments")
    })
}

async fn create_key(
    State(state): State<AppState>,
    payload: Result<Json<CreateKeyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedKey>)> {
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "Rejected create body");
        ApiError::invalid_argument(e.body_text())
    })?;

    let created = state.api.create_key(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn search_key(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> ApiResult<Json<KeyDetails>> {
    Ok(Json(state.api.search_key(&value).await?))
}

async fn list_keys(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<OwnerKeys>> {
    Ok(Json(state.api.list_keys(&owner_id).await?))
}

async fn internal_search_key(
    State(state): State<AppState>,
    path: Result<Path<(String, KeyId)>, PathRejection>,
) -> ApiResult<Json<InternalKeyDetails>> {
    let (owner_id, key_id) = owner_key_path(path)?;
    Ok(Json(state.api.internal_search_key(key_id, &owner_id).await?))
}

async fn delete_key(
    State(state): State<AppState>,
    path: Result<Path<(String, KeyId)>, PathRejection>,
) -> ApiResult<Json<DeletedKey>> {
    let (owner_id, key_id) = owner_key_path(path)?;
    let deleted_key_id = state.api.delete_key(key_id, &owner_id).await?;
    Ok(Json(DeletedKey { deleted_key_id }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pk-api-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
