use std::cmp::Reverse;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use bloodbank_shared::errors::{AppError, AppResult, ErrorCode};
use bloodbank_shared::types::BloodGroup;

use crate::geo::{nearby_donors, Geocoder, NearbyDonor};
use crate::models::{BloodRequest, Identity, NewIdentity, NewUserProfile, Notification, UserProfile};
use crate::services::notification_service;
use crate::store::BloodBankStore;

const DASHBOARD_OWN_REQUESTS: i64 = 5;
const DASHBOARD_MATCHING_REQUESTS: usize = 3;
const DASHBOARD_NOTIFICATIONS: i64 = 5;

// --- Forms ---

/// Profile registration. Identity fields are only used the first time the
/// caller's identity is mirrored locally.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterProfile {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub last_name: String,
    pub blood_group: BloodGroup,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub date_of_birth: NaiveDate,
}

/// Partial profile edit; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditProfile {
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub first_name: Option<String>,
    #[validate(length(max = 30))]
    pub last_name: Option<String>,
    pub blood_group: Option<BloodGroup>,
    #[validate(length(min = 1, max = 15))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_donor: Option<bool>,
    pub is_available: Option<bool>,
    pub last_donation_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub profile: UserProfile,
    pub my_requests: Vec<BloodRequest>,
    /// Own requests still pending or accepted.
    pub active_request_count: usize,
    pub matching_requests: Vec<BloodRequest>,
    pub notifications: Vec<DashboardNotification>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardNotification {
    #[serde(flatten)]
    pub notification: Notification,
    pub is_recent: bool,
}

// --- Operations ---

/// Register the caller as an available donor.
pub fn register_profile(
    store: &dyn BloodBankStore,
    geocoder: &dyn Geocoder,
    user_id: Uuid,
    form: RegisterProfile,
) -> AppResult<UserProfile> {
    form.validate()?;

    if store.find_profile(user_id)?.is_some() {
        return Err(AppError::new(
            ErrorCode::ProfileAlreadyExists,
            "a profile already exists for this user",
        ));
    }

    if store.find_identity(user_id)?.is_none() {
        mirror_identity(store, user_id, &form)?;
    }

    let (latitude, longitude) = geocoder.geocode(&form.address)?;

    let profile = store.insert_profile(NewUserProfile {
        user_id,
        blood_group: form.blood_group,
        phone: form.phone,
        address: form.address,
        date_of_birth: Some(form.date_of_birth),
        is_donor: true,
        is_available: true,
        latitude: Some(latitude),
        longitude: Some(longitude),
    })?;

    tracing::info!(
        user_id = %user_id,
        profile_id = %profile.id,
        blood_group = %profile.blood_group,
        "profile registered"
    );

    Ok(profile)
}

fn mirror_identity(store: &dyn BloodBankStore, user_id: Uuid, form: &RegisterProfile) -> AppResult<Identity> {
    let username = form
        .username
        .clone()
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "username is required"))?;

    if store.find_identity_by_username(&username)?.is_some() {
        return Err(AppError::new(ErrorCode::ValidationError, "username is already taken"));
    }

    let identity = store.insert_identity(NewIdentity {
        id: user_id,
        username,
        email: form.email.clone().unwrap_or_default(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
    })?;

    tracing::debug!(user_id = %user_id, username = %identity.username, "identity mirrored");
    Ok(identity)
}

pub fn get_profile(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<UserProfile> {
    store
        .find_profile(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Apply an edit. A changed address is geocoded again.
///
/// Switching availability on here does not notify anyone; only
/// `lifecycle::toggle_availability` does.
pub fn edit_profile(
    store: &dyn BloodBankStore,
    geocoder: &dyn Geocoder,
    user_id: Uuid,
    changes: EditProfile,
) -> AppResult<UserProfile> {
    changes.validate()?;

    let mut profile = get_profile(store, user_id)?;

    if changes.email.is_some() || changes.first_name.is_some() || changes.last_name.is_some() {
        let mut identity = store
            .find_identity(user_id)?
            .ok_or_else(|| AppError::not_found("identity not found"))?;
        if let Some(email) = changes.email {
            identity.email = email;
        }
        if let Some(first_name) = changes.first_name {
            identity.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            identity.last_name = last_name;
        }
        store.update_identity(&identity)?;
    }

    if let Some(address) = changes.address {
        if address != profile.address {
            let (latitude, longitude) = geocoder.geocode(&address)?;
            profile.latitude = Some(latitude);
            profile.longitude = Some(longitude);
            profile.address = address;
        }
    }
    if let Some(blood_group) = changes.blood_group {
        profile.blood_group = blood_group;
    }
    if let Some(phone) = changes.phone {
        profile.phone = phone;
    }
    if changes.date_of_birth.is_some() {
        profile.date_of_birth = changes.date_of_birth;
    }
    if let Some(is_donor) = changes.is_donor {
        profile.is_donor = is_donor;
    }
    if let Some(is_available) = changes.is_available {
        profile.is_available = is_available;
    }
    if changes.last_donation_date.is_some() {
        profile.last_donation_date = changes.last_donation_date;
    }

    let profile = store.update_profile(&profile)?;
    tracing::info!(user_id = %user_id, "profile updated");
    Ok(profile)
}

/// Available donors other than the viewer, by group and address text.
pub fn search_donors(
    store: &dyn BloodBankStore,
    viewer_id: Uuid,
    blood_group: Option<BloodGroup>,
    location: Option<&str>,
) -> AppResult<Vec<UserProfile>> {
    let needle = location
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    Ok(store
        .available_donors(blood_group)?
        .into_iter()
        .filter(|p| p.user_id != viewer_id)
        .filter(|p| {
            needle
                .as_deref()
                .map_or(true, |n| p.address.to_lowercase().contains(n))
        })
        .collect())
}

/// Available donors within `radius_km` of a point, nearest first.
pub fn find_nearby(
    store: &dyn BloodBankStore,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    blood_group: Option<BloodGroup>,
) -> AppResult<Vec<NearbyDonor>> {
    let donors = store.available_donors(blood_group)?;
    Ok(nearby_donors(&donors, latitude, longitude, radius_km, blood_group))
}

pub fn dashboard(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<Dashboard> {
    let profile = get_profile(store, user_id)?;
    let my_requests = store.requests_by_requester(user_id, Some(DASHBOARD_OWN_REQUESTS))?;

    let matching_requests = if profile.is_eligible_donor() {
        let mut pending: Vec<BloodRequest> = store
            .pending_requests(profile.blood_group)?
            .into_iter()
            .filter(|r| r.requester_id != user_id)
            .collect();
        pending.sort_by_key(|r| (Reverse(r.urgency), Reverse(r.created_at)));
        pending.truncate(DASHBOARD_MATCHING_REQUESTS);
        pending
    } else {
        Vec::new()
    };

    let active_request_count = my_requests.iter().filter(|r| r.is_active()).count();

    let now = Utc::now();
    let notifications = notification_service::recent_notifications(store, user_id, DASHBOARD_NOTIFICATIONS)?
        .into_iter()
        .map(|notification| DashboardNotification {
            is_recent: notification.is_recent(now),
            notification,
        })
        .collect();
    let unread_count = notification_service::count_unread(store, user_id)?;

    Ok(Dashboard {
        profile,
        my_requests,
        active_request_count,
        matching_requests,
        notifications,
        unread_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::StaticGeocoder;
    use crate::models::{RequestStatus, Urgency};
    use crate::services::lifecycle::{self, BloodRequestForm};
    use crate::store::MemoryStore;

    fn form(username: &str, group: BloodGroup, address: &str) -> RegisterProfile {
        RegisterProfile {
            username: Some(username.into()),
            email: Some(format!("{username}@uap.edu.bd")),
            first_name: String::new(),
            last_name: String::new(),
            blood_group: group,
            phone: "0123456789".into(),
            address: address.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1998, 1, 1).unwrap(),
        }
    }

    fn register(store: &MemoryStore, username: &str, group: BloodGroup, address: &str) -> Uuid {
        let id = Uuid::now_v7();
        register_profile(store, &StaticGeocoder::default(), id, form(username, group, address)).unwrap();
        id
    }

    #[test]
    fn register_geocodes_and_marks_available() {
        let store = MemoryStore::new();
        let id = Uuid::now_v7();
        let profile = register_profile(
            &store,
            &StaticGeocoder::default(),
            id,
            form("joynove_mim", BloodGroup::OPositive, "Mirpur-10, Dhaka"),
        )
        .unwrap();

        assert!(profile.is_donor && profile.is_available);
        assert_eq!(profile.coordinates(), Some((23.8067, 90.3683)));
        assert_eq!(store.find_identity(id).unwrap().unwrap().username, "joynove_mim");
    }

    #[test]
    fn second_registration_conflicts() {
        let store = MemoryStore::new();
        let id = Uuid::now_v7();
        let geocoder = StaticGeocoder::default();
        register_profile(&store, &geocoder, id, form("a", BloodGroup::APositive, "UAP Campus")).unwrap();

        let err = register_profile(&store, &geocoder, id, form("a", BloodGroup::APositive, "UAP Campus")).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::ProfileAlreadyExists));
    }

    #[test]
    fn register_rejects_bad_fields() {
        let store = MemoryStore::new();
        let geocoder = StaticGeocoder::default();

        let mut bad = form("a", BloodGroup::APositive, "");
        assert!(register_profile(&store, &geocoder, Uuid::now_v7(), bad.clone()).is_err());

        bad.address = "UAP Campus".into();
        bad.phone = "0123456789012345".into();
        let err = register_profile(&store, &geocoder, Uuid::now_v7(), bad).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::ValidationError));

        let mut anonymous = form("a", BloodGroup::APositive, "UAP Campus");
        anonymous.username = None;
        assert!(register_profile(&store, &geocoder, Uuid::now_v7(), anonymous).is_err());
    }

    #[test]
    fn names_longer_than_column_are_rejected() {
        let store = MemoryStore::new();
        let geocoder = StaticGeocoder::default();
        let long_name = "x".repeat(31);

        let id = Uuid::now_v7();
        let mut too_long = form("long_name", BloodGroup::APositive, "UAP Campus");
        too_long.first_name = long_name.clone();
        let err = register_profile(&store, &geocoder, id, too_long).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::ValidationError));
        assert!(store.find_identity(id).unwrap().is_none());

        let mut fits = form("short_name", BloodGroup::APositive, "UAP Campus");
        fits.last_name = "y".repeat(30);
        let id = Uuid::now_v7();
        register_profile(&store, &geocoder, id, fits).unwrap();

        let edit = EditProfile { last_name: Some(long_name), ..Default::default() };
        let err = edit_profile(&store, &geocoder, id, edit).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::ValidationError));
        assert_eq!(store.find_identity(id).unwrap().unwrap().last_name, "y".repeat(30));
    }

    #[test]
    fn edit_regeocodes_only_on_address_change() {
        let store = MemoryStore::new();
        let geocoder = StaticGeocoder::default();
        let id = register(&store, "samia_zaman", BloodGroup::BNegative, "UAP Campus");

        let edited = edit_profile(
            &store,
            &geocoder,
            id,
            EditProfile {
                address: Some("Gulshan-2, Dhaka".into()),
                first_name: Some("Samia".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.coordinates(), Some((23.7940, 90.4154)));
        assert_eq!(store.find_identity(id).unwrap().unwrap().first_name, "Samia");

        let same = edit_profile(
            &store,
            &geocoder,
            id,
            EditProfile {
                phone: Some("0123456793".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(same.coordinates(), Some((23.7940, 90.4154)));
        assert_eq!(same.phone, "0123456793");
    }

    #[test]
    fn edit_availability_does_not_notify() {
        let store = MemoryStore::new();
        let geocoder = StaticGeocoder::default();
        let requester = register(&store, "requester", BloodGroup::OPositive, "UAP Campus");
        lifecycle::create_request(&store, requester, BloodRequestForm::new(BloodGroup::OPositive, 1)).unwrap();

        let donor = register(&store, "donor", BloodGroup::OPositive, "UAP Campus");
        let off = EditProfile { is_available: Some(false), ..Default::default() };
        edit_profile(&store, &geocoder, donor, off).unwrap();
        let on = EditProfile { is_available: Some(true), ..Default::default() };
        edit_profile(&store, &geocoder, donor, on).unwrap();

        assert_eq!(notification_service::count_unread(&store, requester).unwrap(), 0);
    }

    #[test]
    fn search_filters_group_and_location() {
        let store = MemoryStore::new();
        let viewer = register(&store, "viewer", BloodGroup::OPositive, "Mirpur");
        let mirpur = register(&store, "mirpur_o", BloodGroup::OPositive, "Mirpur DOHS");
        register(&store, "banani_o", BloodGroup::OPositive, "Banani");
        register(&store, "mirpur_a", BloodGroup::APositive, "mirpur 1");

        let hits = search_donors(&store, viewer, Some(BloodGroup::OPositive), Some("MIRPUR")).unwrap();
        let ids: Vec<Uuid> = hits.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![mirpur]);

        assert_eq!(search_donors(&store, viewer, None, None).unwrap().len(), 3);
        assert_eq!(search_donors(&store, viewer, None, Some("  ")).unwrap().len(), 3);
    }

    #[test]
    fn nearby_uses_radius() {
        let store = MemoryStore::new();
        register(&store, "campus", BloodGroup::APositive, "UAP Campus");
        register(&store, "gulshan", BloodGroup::APositive, "Gulshan");

        let (lat, lon) = crate::geo::CAMPUS;
        assert_eq!(find_nearby(&store, lat, lon, 1.0, None).unwrap().len(), 1);
        let wide = find_nearby(&store, lat, lon, 5.0, Some(BloodGroup::APositive)).unwrap();
        assert_eq!(wide.len(), 2);
        assert!(wide[0].distance_km <= wide[1].distance_km);
    }

    #[test]
    fn dashboard_orders_matching_by_urgency() {
        let store = MemoryStore::new();
        let me = register(&store, "me", BloodGroup::OPositive, "UAP Campus");
        let other = register(&store, "other", BloodGroup::APositive, "UAP Campus");

        let mut normal = BloodRequestForm::new(BloodGroup::OPositive, 1);
        normal.urgency = Urgency::Normal;
        let mut emergency = BloodRequestForm::new(BloodGroup::OPositive, 1);
        emergency.urgency = Urgency::Emergency;
        let mut urgent = BloodRequestForm::new(BloodGroup::OPositive, 1);
        urgent.urgency = Urgency::Urgent;

        lifecycle::create_request(&store, other, normal.clone()).unwrap();
        lifecycle::create_request(&store, other, emergency).unwrap();
        lifecycle::create_request(&store, other, urgent).unwrap();
        lifecycle::create_request(&store, other, normal).unwrap();
        lifecycle::create_request(&store, me, BloodRequestForm::new(BloodGroup::OPositive, 1)).unwrap();

        let dash = dashboard(&store, me).unwrap();
        let urgencies: Vec<Urgency> = dash.matching_requests.iter().map(|r| r.urgency).collect();
        assert_eq!(urgencies, vec![Urgency::Emergency, Urgency::Urgent, Urgency::Normal]);
        assert!(dash.matching_requests.iter().all(|r| r.requester_id != me));
        assert_eq!(dash.my_requests.len(), 1);
        assert_eq!(dash.active_request_count, 1);
        assert_eq!(dash.unread_count, 4);
        assert_eq!(dash.notifications.len(), 4);
        assert!(dash.notifications.iter().all(|n| n.is_recent));
    }

    #[test]
    fn dashboard_hides_matches_for_unavailable_donor() {
        let store = MemoryStore::new();
        let me = register(&store, "me", BloodGroup::OPositive, "UAP Campus");
        let other = register(&store, "other", BloodGroup::APositive, "UAP Campus");
        lifecycle::create_request(&store, other, BloodRequestForm::new(BloodGroup::OPositive, 1)).unwrap();
        lifecycle::toggle_availability(&store, me).unwrap();

        assert!(dashboard(&store, me).unwrap().matching_requests.is_empty());
    }

    #[test]
    fn dashboard_counts_only_active_requests() {
        let store = MemoryStore::new();
        let me = register(&store, "me", BloodGroup::OPositive, "UAP Campus");
        let kept = lifecycle::create_request(&store, me, BloodRequestForm::new(BloodGroup::APositive, 1)).unwrap();
        let dropped = lifecycle::create_request(&store, me, BloodRequestForm::new(BloodGroup::APositive, 1)).unwrap();
        lifecycle::set_status(&store, dropped.id, RequestStatus::Cancelled).unwrap();

        let dash = dashboard(&store, me).unwrap();
        assert_eq!(dash.my_requests.len(), 2);
        assert_eq!(dash.active_request_count, 1);
        assert!(dash.my_requests.iter().any(|r| r.id == kept.id && r.is_active()));
    }
}
