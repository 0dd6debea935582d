//! Diesel row types. Enumerations are stored as text and parsed here.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use bloodbank_shared::errors::{AppError, AppResult};

use crate::models::{
    BloodRequest, Identity, NewBloodRequest, NewIdentity, NewNotification, NewUserProfile,
    Notification, UserProfile,
};
use crate::schema::{blood_requests, notifications, profiles, users};

fn parse_column<T>(column: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        tracing::error!(column, value, error = %e, "corrupt enum column");
        AppError::internal(format!("corrupt {column} column"))
    })
}

// --- users ---

#[derive(Debug, Queryable)]
pub struct IdentityRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewIdentityRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<NewIdentity> for NewIdentityRow {
    fn from(new: NewIdentity) -> Self {
        Self {
            id: new.id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
        }
    }
}

// --- profiles ---

#[derive(Debug, Queryable)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_donor: bool,
    pub is_available: bool,
    pub last_donation_date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            blood_group: parse_column("blood_group", &row.blood_group)?,
            phone: row.phone,
            address: row.address,
            date_of_birth: row.date_of_birth,
            is_donor: row.is_donor,
            is_available: row.is_available,
            last_donation_date: row.last_donation_date,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfileRow {
    pub user_id: Uuid,
    pub blood_group: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_donor: bool,
    pub is_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<NewUserProfile> for NewProfileRow {
    fn from(new: NewUserProfile) -> Self {
        Self {
            user_id: new.user_id,
            blood_group: new.blood_group.label().to_string(),
            phone: new.phone,
            address: new.address,
            date_of_birth: new.date_of_birth,
            is_donor: new.is_donor,
            is_available: new.is_available,
            latitude: new.latitude,
            longitude: new.longitude,
        }
    }
}

// --- blood_requests ---

#[derive(Debug, Queryable)]
pub struct BloodRequestRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub blood_group: String,
    pub units_required: i32,
    pub urgency: String,
    pub message: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub needed_by: DateTime<Utc>,
    pub accepted_by: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl TryFrom<BloodRequestRow> for BloodRequest {
    type Error = AppError;

    fn try_from(row: BloodRequestRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            requester_id: row.requester_id,
            blood_group: parse_column("blood_group", &row.blood_group)?,
            units_required: row.units_required,
            urgency: parse_column("urgency", &row.urgency)?,
            message: row.message,
            hospital_name: row.hospital_name,
            hospital_address: row.hospital_address,
            contact_person: row.contact_person,
            contact_phone: row.contact_phone,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
            needed_by: row.needed_by,
            accepted_by: row.accepted_by,
            accepted_at: row.accepted_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blood_requests)]
pub struct NewBloodRequestRow {
    pub requester_id: Uuid,
    pub blood_group: String,
    pub units_required: i32,
    pub urgency: String,
    pub message: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub needed_by: DateTime<Utc>,
}

impl From<NewBloodRequest> for NewBloodRequestRow {
    fn from(new: NewBloodRequest) -> Self {
        Self {
            requester_id: new.requester_id,
            blood_group: new.blood_group.label().to_string(),
            units_required: new.units_required,
            urgency: new.urgency.as_str().to_string(),
            message: new.message,
            hospital_name: new.hospital_name,
            hospital_address: new.hospital_address,
            contact_person: new.contact_person,
            contact_phone: new.contact_phone,
            needed_by: new.needed_by,
        }
    }
}

// --- notifications ---

#[derive(Debug, Queryable)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub blood_request_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            notification_type: parse_column("notification_type", &row.notification_type)?,
            title: row.title,
            message: row.message,
            blood_request_id: row.blood_request_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub blood_request_id: Option<Uuid>,
}

impl From<NewNotification> for NewNotificationRow {
    fn from(new: NewNotification) -> Self {
        Self {
            user_id: new.user_id,
            notification_type: new.notification_type.as_str().to_string(),
            title: new.title,
            message: new.message,
            blood_request_id: new.blood_request_id,
        }
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub fn convert_all<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodbank_shared::types::BloodGroup;
    use crate::models::{NotificationType, RequestStatus, Urgency};

    #[test]
    fn request_row_parses_enums() {
        let now = Utc::now();
        let row = BloodRequestRow {
            id: Uuid::now_v7(),
            requester_id: Uuid::now_v7(),
            blood_group: "AB-".into(),
            units_required: 2,
            urgency: "emergency".into(),
            message: String::new(),
            hospital_name: "UAP Medical Center".into(),
            hospital_address: "UAP Campus, Kuratoli, Dhaka".into(),
            contact_person: "Medical Staff".into(),
            contact_phone: "0123456789".into(),
            status: "accepted".into(),
            created_at: now,
            needed_by: now,
            accepted_by: Some(Uuid::now_v7()),
            accepted_at: Some(now),
        };
        let request = BloodRequest::try_from(row).unwrap();
        assert_eq!(request.blood_group, BloodGroup::AbNegative);
        assert_eq!(request.urgency, Urgency::Emergency);
        assert_eq!(request.status, RequestStatus::Accepted);
    }

    #[test]
    fn corrupt_enum_is_an_error() {
        let row = NotificationRow {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            notification_type: "carrier_pigeon".into(),
            title: "t".into(),
            message: "m".into(),
            blood_request_id: None,
            is_read: false,
            created_at: Utc::now(),
        };
        assert!(Notification::try_from(row).is_err());
    }

    #[test]
    fn new_notification_row_stores_snake_case_type() {
        let row = NewNotificationRow::from(NewNotification {
            user_id: Uuid::now_v7(),
            notification_type: NotificationType::RequestAccepted,
            title: "t".into(),
            message: "m".into(),
            blood_request_id: None,
        });
        assert_eq!(row.notification_type, "request_accepted");
    }
}
