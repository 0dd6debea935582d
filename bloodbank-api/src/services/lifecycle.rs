use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use bloodbank_shared::errors::{AppError, AppResult, ErrorCode};
use bloodbank_shared::types::BloodGroup;

use crate::models::{
    BloodRequest, NewBloodRequest, RequestStatus, Urgency, UserProfile, DEFAULT_CONTACT_PERSON,
    DEFAULT_CONTACT_PHONE, DEFAULT_HOSPITAL_ADDRESS, DEFAULT_HOSPITAL_NAME,
};
use crate::services::notification_service;
use crate::store::BloodBankStore;

// --- Blood request form ---

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BloodRequestForm {
    pub blood_group: BloodGroup,
    #[serde(default = "default_units")]
    #[validate(range(min = 1, message = "at least one unit is required"))]
    pub units_required: i32,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_hospital_name")]
    #[validate(length(min = 1, max = 255))]
    pub hospital_name: String,
    #[serde(default = "default_hospital_address")]
    #[validate(length(min = 1))]
    pub hospital_address: String,
    #[serde(default = "default_contact_person")]
    #[validate(length(min = 1, max = 100))]
    pub contact_person: String,
    #[serde(default = "default_contact_phone")]
    #[validate(length(min = 1, max = 15))]
    pub contact_phone: String,
    /// Defaults to now.
    #[serde(default)]
    pub needed_by: Option<DateTime<Utc>>,
}

fn default_units() -> i32 { 1 }
fn default_hospital_name() -> String { DEFAULT_HOSPITAL_NAME.into() }
fn default_hospital_address() -> String { DEFAULT_HOSPITAL_ADDRESS.into() }
fn default_contact_person() -> String { DEFAULT_CONTACT_PERSON.into() }
fn default_contact_phone() -> String { DEFAULT_CONTACT_PHONE.into() }

impl BloodRequestForm {
    /// A form with every optional field at its default.
    pub fn new(blood_group: BloodGroup, units_required: i32) -> Self {
        Self {
            blood_group,
            units_required,
            urgency: Urgency::default(),
            message: String::new(),
            hospital_name: default_hospital_name(),
            hospital_address: default_hospital_address(),
            contact_person: default_contact_person(),
            contact_phone: default_contact_phone(),
            needed_by: None,
        }
    }
}

fn require_identity(store: &dyn BloodBankStore, user_id: Uuid, action: &str) -> AppResult<()> {
    match store.find_identity(user_id)? {
        Some(_) => Ok(()),
        None => Err(AppError::new(
            ErrorCode::ProfileNotFound,
            format!("register a profile before {action}"),
        )),
    }
}

/// Submit a blood request and notify matching donors.
pub fn create_request(
    store: &dyn BloodBankStore,
    requester_id: Uuid,
    form: BloodRequestForm,
) -> AppResult<BloodRequest> {
    form.validate()?;
    require_identity(store, requester_id, "requesting blood")?;

    let request = store.insert_request(NewBloodRequest {
        requester_id,
        blood_group: form.blood_group,
        units_required: form.units_required,
        urgency: form.urgency,
        message: form.message,
        hospital_name: form.hospital_name,
        hospital_address: form.hospital_address,
        contact_person: form.contact_person,
        contact_phone: form.contact_phone,
        needed_by: form.needed_by.unwrap_or_else(Utc::now),
    })?;

    counter!("blood_requests_created_total").increment(1);
    tracing::info!(
        request_id = %request.id,
        requester_id = %requester_id,
        blood_group = %request.blood_group,
        urgency = %request.urgency,
        "blood request created"
    );

    notification_service::notify_request_created(store, &request)?;

    Ok(request)
}

/// Accept someone else's request and notify the requester.
///
/// The current status is not checked: accepting an already accepted request
/// replaces the accepter, and with no locking the last concurrent write wins.
pub fn accept_request(
    store: &dyn BloodBankStore,
    request_id: Uuid,
    accepter_id: Uuid,
) -> AppResult<BloodRequest> {
    let mut request = store
        .find_request(request_id)?
        .ok_or_else(|| AppError::new(ErrorCode::BloodRequestNotFound, "blood request not found"))?;

    if request.requester_id == accepter_id {
        tracing::warn!(request_id = %request_id, user_id = %accepter_id, "self-accept rejected");
        return Err(AppError::new(
            ErrorCode::CannotAcceptOwnRequest,
            "you cannot accept your own request",
        ));
    }
    require_identity(store, accepter_id, "accepting requests")?;

    if let Some(previous) = request.accepted_by.filter(|prev| *prev != accepter_id) {
        tracing::warn!(
            request_id = %request_id,
            previous_accepter = %previous,
            accepter_id = %accepter_id,
            "overwriting previous accepter"
        );
    }

    request.status = RequestStatus::Accepted;
    request.accepted_by = Some(accepter_id);
    request.accepted_at = Some(Utc::now());
    let request = store.update_request(&request)?;

    counter!("blood_requests_accepted_total").increment(1);
    tracing::info!(request_id = %request.id, accepter_id = %accepter_id, "blood request accepted");

    notification_service::notify_request_accepted(store, &request)?;

    Ok(request)
}

/// Flip the caller's availability. Becoming available notifies requesters of
/// pending requests in the same blood group.
pub fn toggle_availability(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<UserProfile> {
    let mut profile = store
        .find_profile(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let was_available = profile.is_available;
    profile.is_available = !was_available;
    let profile = store.update_profile(&profile)?;

    tracing::info!(user_id = %user_id, available = profile.is_available, "availability toggled");

    if !was_available && profile.is_available {
        notification_service::notify_donor_available(store, &profile)?;
    }

    Ok(profile)
}

/// Administrative status change: cancel or expire a pending request, or
/// complete an accepted one.
pub fn set_status(
    store: &dyn BloodBankStore,
    request_id: Uuid,
    status: RequestStatus,
) -> AppResult<BloodRequest> {
    let mut request = store
        .find_request(request_id)?
        .ok_or_else(|| AppError::new(ErrorCode::BloodRequestNotFound, "blood request not found"))?;

    if !request.status.can_move_to(status) {
        return Err(AppError::new(
            ErrorCode::InvalidStatusTransition,
            format!("cannot move a {} request to {status}", request.status),
        ));
    }

    let previous = request.status;
    request.status = status;
    let request = store.update_request(&request)?;

    tracing::info!(
        request_id = %request.id,
        from = %previous,
        to = %status,
        "blood request status changed"
    );

    notification_service::notify_status_changed(store, &request)?;

    Ok(request)
}

/// The caller's requests, newest first.
pub fn request_history(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<Vec<BloodRequest>> {
    store.requests_by_requester(user_id, None)
}
