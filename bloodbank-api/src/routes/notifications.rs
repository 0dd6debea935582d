use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::middleware::{ApiPath, ApiQuery};
use bloodbank_shared::types::api::ApiResponse;
use bloodbank_shared::types::auth::AuthUser;
use bloodbank_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::Notification;
use crate::services::notification_service;
use crate::AppState;

/// GET /notifications
/// One page of the caller's notifications. Viewing the inbox marks
/// everything read; the page shows items as they were before.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Notification>>>> {
    let (items, total) = notification_service::view_inbox(state.store.as_ref(), auth_user.id, &params)?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let count = notification_service::count_unread(state.store.as_ref(), auth_user.id)?;

    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

#[derive(Debug, serde::Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// POST /notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<MarkAllReadResponse>>> {
    let updated = notification_service::mark_all_read(state.store.as_ref(), auth_user.id)?;

    Ok(Json(ApiResponse::ok(MarkAllReadResponse { updated })))
}

#[derive(Debug, serde::Serialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

/// POST /notifications/:id/read
/// Only the owner can mark a notification read.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::mark_read(state.store.as_ref(), id, auth_user.id)?;

    Ok(Json(ApiResponse::ok(notification)))
}
