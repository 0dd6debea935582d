use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::middleware::{AdminUser, ApiJson, ApiPath};
use bloodbank_shared::types::api::ApiResponse;

use crate::models::{BloodRequest, RequestStatus};
use crate::services::lifecycle;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: RequestStatus,
}

/// POST /admin/requests/:id/status
pub async fn set_request_status(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(change): ApiJson<StatusChange>,
) -> AppResult<Json<ApiResponse<BloodRequest>>> {
    tracing::info!(admin_id = %admin.id, request_id = %id, status = %change.status, "admin status change");

    let request = lifecycle::set_status(state.store.as_ref(), id, change.status)?;
    Ok(Json(ApiResponse::ok(request)))
}
