use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::types::api::ApiResponse;
use bloodbank_shared::types::auth::AuthUser;

use crate::services::profile_service::{self, Dashboard};
use crate::AppState;

pub async fn dashboard(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let dashboard = profile_service::dashboard(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(dashboard)))
}
