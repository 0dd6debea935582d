use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use bloodbank_shared::errors::{AppError, AppResult, ErrorCode};
use bloodbank_shared::middleware::ApiQuery;
use bloodbank_shared::types::api::ApiResponse;
use bloodbank_shared::types::auth::AuthUser;
use bloodbank_shared::types::BloodGroup;

use crate::geo::NearbyDonor;
use crate::models::UserProfile;
use crate::services::profile_service;
use crate::AppState;

/// Optional blood-group query parameter. Empty means "any".
///
/// An unencoded `+` arrives as a space, so "O " is read as "O+".
fn parse_blood_group(raw: Option<&str>) -> AppResult<Option<BloodGroup>> {
    let Some(raw) = raw else { return Ok(None) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let label = if raw.trim_start().len() > trimmed.len() {
        format!("{trimmed}+")
    } else {
        trimmed.to_string()
    };

    label
        .parse()
        .map(Some)
        .map_err(|e: String| AppError::new(ErrorCode::ValidationError, e))
}

// --- GET /donors ---

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub blood_group: Option<String>,
    pub location: Option<String>,
}

pub async fn search_donors(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let blood_group = parse_blood_group(query.blood_group.as_deref())?;
    let donors = profile_service::search_donors(
        state.store.as_ref(),
        user.id,
        blood_group,
        query.location.as_deref(),
    )?;

    Ok(Json(ApiResponse::ok(donors)))
}

// --- GET /donors/nearby ---

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub blood_group: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NearbyDonorResponse {
    pub donor: UserProfile,
    pub distance_km: f64,
}

impl From<NearbyDonor> for NearbyDonorResponse {
    fn from(nearby: NearbyDonor) -> Self {
        Self {
            donor: nearby.profile,
            distance_km: (nearby.distance_km * 100.0).round() / 100.0,
        }
    }
}

fn search_origin(state: &AppState, user: &AuthUser, query: &NearbyQuery) -> AppResult<(f64, f64)> {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        (None, None) => profile_service::get_profile(state.store.as_ref(), user.id)?
            .coordinates()
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::ValidationError,
                    "lat and lon are required when your profile has no location",
                )
            })?,
        _ => {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "lat and lon must be given together",
            ))
        }
    };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::new(ErrorCode::ValidationError, "coordinates out of range"));
    }
    Ok((lat, lon))
}

pub async fn nearby_donors(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NearbyQuery>,
) -> AppResult<Json<ApiResponse<Vec<NearbyDonorResponse>>>> {
    let blood_group = parse_blood_group(query.blood_group.as_deref())?;
    let (lat, lon) = search_origin(&state, &user, &query)?;

    let radius_km = query.radius_km.unwrap_or(state.config.default_radius_km);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(AppError::new(ErrorCode::ValidationError, "radius_km must be positive"));
    }

    let donors = profile_service::find_nearby(state.store.as_ref(), lat, lon, radius_km, blood_group)?
        .into_iter()
        .map(NearbyDonorResponse::from)
        .collect();

    Ok(Json(ApiResponse::ok(donors)))
}
