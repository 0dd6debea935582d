use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::middleware::ApiJson;
use bloodbank_shared::types::api::ApiResponse;
use bloodbank_shared::types::auth::AuthUser;

use crate::models::{Identity, UserProfile};
use crate::services::profile_service::{self, EditProfile, RegisterProfile};
use crate::services::lifecycle;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Option<Identity>,
    pub profile: UserProfile,
}

fn with_identity(state: &AppState, profile: UserProfile) -> AppResult<ProfileResponse> {
    let user = state.store.find_identity(profile.user_id)?;
    Ok(ProfileResponse { user, profile })
}

// --- POST /profile ---

pub async fn register_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<RegisterProfile>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProfileResponse>>)> {
    let profile = profile_service::register_profile(state.store.as_ref(), state.geocoder.as_ref(), user.id, form)?;
    let body = with_identity(&state, profile)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(body, "Profile created successfully!")),
    ))
}

// --- GET /profile ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let profile = profile_service::get_profile(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(with_identity(&state, profile)?)))
}

// --- PATCH /profile ---

pub async fn edit_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(changes): ApiJson<EditProfile>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let profile = profile_service::edit_profile(state.store.as_ref(), state.geocoder.as_ref(), user.id, changes)?;
    let body = with_identity(&state, profile)?;
    Ok(Json(ApiResponse::ok_with_message(body, "Profile updated successfully!")))
}

// --- POST /profile/toggle-availability ---

pub async fn toggle_availability(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = lifecycle::toggle_availability(state.store.as_ref(), user.id)?;
    let message = if profile.is_available {
        "You are now available for donation"
    } else {
        "You are now unavailable for donation"
    };
    Ok(Json(ApiResponse::ok_with_message(profile, message)))
}
