use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::middleware::{ApiJson, ApiPath};
use bloodbank_shared::types::api::ApiResponse;
use bloodbank_shared::types::auth::AuthUser;

use crate::models::BloodRequest;
use crate::services::lifecycle::{self, BloodRequestForm};
use crate::AppState;

/// POST /requests
/// Submit a blood request; matching available donors are notified.
pub async fn create_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<BloodRequestForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<BloodRequest>>)> {
    let request = lifecycle::create_request(state.store.as_ref(), user.id, form)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            request,
            "Blood request created successfully! Donors have been notified.",
        )),
    ))
}

/// GET /requests
/// The caller's own requests, newest first.
pub async fn request_history(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<BloodRequest>>>> {
    let requests = lifecycle::request_history(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(requests)))
}

/// POST /requests/:id/accept
pub async fn accept_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<BloodRequest>>> {
    let request = lifecycle::accept_request(state.store.as_ref(), id, user.id)?;
    Ok(Json(ApiResponse::ok_with_message(request, "Request accepted successfully!")))
}
