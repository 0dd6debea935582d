use metrics::counter;
use uuid::Uuid;

use bloodbank_shared::errors::{AppError, AppResult, ErrorCode};
use bloodbank_shared::types::pagination::PaginationParams;

use crate::models::{BloodRequest, NewNotification, Notification, NotificationType, RequestStatus, UserProfile};
use crate::store::BloodBankStore;

/// Create a new notification and persist it, unread.
pub fn create_notification(
    store: &dyn BloodBankStore,
    user_id: Uuid,
    notification_type: NotificationType,
    title: &str,
    message: &str,
    blood_request_id: Option<Uuid>,
) -> AppResult<Notification> {
    let notification = store.insert_notification(NewNotification {
        user_id,
        notification_type,
        title: title.to_string(),
        message: message.to_string(),
        blood_request_id,
    })?;

    counter!("notifications_created_total", "type" => notification_type.as_str()).increment(1);
    tracing::debug!(
        notification_id = %notification.id,
        user_id = %user_id,
        notification_type = %notification_type,
        "notification created"
    );

    Ok(notification)
}

/// Username for message templates.
fn display_name(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<String> {
    store
        .find_identity(user_id)?
        .map(|identity| identity.username)
        .ok_or_else(|| AppError::not_found(format!("user {user_id} not found")))
}

/// Tell every available donor of the request's group about a new request.
///
/// The requester is never notified, even when they are an eligible donor
/// themselves. The first failed write aborts the rest of the fan-out.
pub fn notify_request_created(
    store: &dyn BloodBankStore,
    request: &BloodRequest,
) -> AppResult<Vec<Notification>> {
    let requester = display_name(store, request.requester_id)?;
    let group = request.blood_group;

    let title = format!("🩸 New Blood Request for {group}");
    let message = format!(
        "Urgent: {requester} needs {} unit(s) of {group} blood at {}. Please check if you can help.",
        request.units_required, request.hospital_name,
    );

    let audience: Vec<UserProfile> = store
        .available_donors(Some(group))?
        .into_iter()
        .filter(|donor| donor.user_id != request.requester_id)
        .collect();

    let mut sent = Vec::with_capacity(audience.len());
    for donor in &audience {
        sent.push(create_notification(
            store,
            donor.user_id,
            NotificationType::BloodRequest,
            &title,
            &message,
            Some(request.id),
        )?);
    }

    tracing::info!(
        request_id = %request.id,
        blood_group = %group,
        recipients = sent.len(),
        "blood request fan-out complete"
    );

    Ok(sent)
}

/// Tell the requester who accepted their request.
pub fn notify_request_accepted(
    store: &dyn BloodBankStore,
    request: &BloodRequest,
) -> AppResult<Notification> {
    let accepter_id = request
        .accepted_by
        .ok_or_else(|| AppError::internal("accepted request has no accepter"))?;
    let accepter = display_name(store, accepter_id)?;

    create_notification(
        store,
        request.requester_id,
        NotificationType::RequestAccepted,
        "✅ Your Blood Request Was Accepted!",
        &format!(
            "Great news! {accepter} has accepted your blood request for {}. Please contact them to arrange donation.",
            request.blood_group,
        ),
        Some(request.id),
    )
}

/// Tell the requester of every pending request of the donor's group that a
/// donor became available.
///
/// The audience is not scoped by location and includes the donor's own
/// pending requests.
pub fn notify_donor_available(
    store: &dyn BloodBankStore,
    profile: &UserProfile,
) -> AppResult<Vec<Notification>> {
    let group = profile.blood_group;
    let pending = store.pending_requests(group)?;

    let mut sent = Vec::with_capacity(pending.len());
    for request in &pending {
        sent.push(create_notification(
            store,
            request.requester_id,
            NotificationType::DonorAvailable,
            &format!("👥 New Donor Available for {}", request.blood_group),
            &format!("A new donor with {group} blood type has become available in your area."),
            Some(request.id),
        )?);
    }

    tracing::info!(
        donor_id = %profile.user_id,
        blood_group = %group,
        recipients = sent.len(),
        "donor available fan-out complete"
    );

    Ok(sent)
}

/// Tell the requester their request was closed by an administrator.
///
/// Only completion and cancellation are announced; expiry is silent.
pub fn notify_status_changed(
    store: &dyn BloodBankStore,
    request: &BloodRequest,
) -> AppResult<Option<Notification>> {
    let (notification_type, title, message) = match request.status {
        RequestStatus::Completed => (
            NotificationType::RequestCompleted,
            "🟢 Blood Request Completed",
            format!("Your blood request for {} has been marked as completed. Thank you!", request.blood_group),
        ),
        RequestStatus::Cancelled => (
            NotificationType::RequestCancelled,
            "🔴 Blood Request Cancelled",
            format!("Your blood request for {} has been cancelled.", request.blood_group),
        ),
        _ => return Ok(None),
    };

    create_notification(
        store,
        request.requester_id,
        notification_type,
        title,
        &message,
        Some(request.id),
    )
    .map(Some)
}

/// List notifications for a user with pagination.
pub fn list_notifications(
    store: &dyn BloodBankStore,
    user_id: Uuid,
    params: &PaginationParams,
) -> AppResult<(Vec<Notification>, i64)> {
    store.list_notifications(user_id, params.limit() as i64, params.offset() as i64)
}

/// List a page of notifications, then mark all of the user's notifications read.
///
/// Items are returned as they were before marking, so callers can still tell
/// which ones were new.
pub fn view_inbox(
    store: &dyn BloodBankStore,
    user_id: Uuid,
    params: &PaginationParams,
) -> AppResult<(Vec<Notification>, i64)> {
    let page = list_notifications(store, user_id, params)?;
    let updated = store.mark_all_read(user_id)?;
    tracing::debug!(user_id = %user_id, updated, "inbox viewed");
    Ok(page)
}

/// Newest `n` notifications.
pub fn recent_notifications(store: &dyn BloodBankStore, user_id: Uuid, n: i64) -> AppResult<Vec<Notification>> {
    store.list_notifications(user_id, n, 0).map(|(items, _)| items)
}

/// Count unread notifications for a user.
pub fn count_unread(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<i64> {
    store.count_unread(user_id)
}

/// Mark all unread notifications as read for a user.
pub fn mark_all_read(store: &dyn BloodBankStore, user_id: Uuid) -> AppResult<usize> {
    store.mark_all_read(user_id)
}

/// Mark a single notification as read (only if it belongs to the user).
pub fn mark_read(store: &dyn BloodBankStore, notification_id: Uuid, user_id: Uuid) -> AppResult<Notification> {
    store
        .mark_read(notification_id, user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::NotificationNotFound, "notification not found"))
}
