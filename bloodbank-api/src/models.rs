use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bloodbank_shared::types::BloodGroup;

pub const DEFAULT_HOSPITAL_NAME: &str = "UAP Medical Center";
pub const DEFAULT_HOSPITAL_ADDRESS: &str = "UAP Campus, Kuratoli, Dhaka";
pub const DEFAULT_CONTACT_PERSON: &str = "Medical Staff";
pub const DEFAULT_CONTACT_PHONE: &str = "0123456789";

// --- Identity ---

/// Local mirror of an identity issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// --- Profile ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: BloodGroup,
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

impl UserProfile {
    /// Donor flag and availability both set: the only profiles that get request notifications.
    pub fn is_eligible_donor(&self) -> bool {
        self.is_donor && self.is_available
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub user_id: Uuid,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_donor: bool,
    pub is_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// --- Blood request ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
            Self::Emergency => "emergency",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Normal => "green",
            Self::Urgent => "orange",
            Self::Emergency => "red",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "urgent" => Ok(Self::Urgent),
            "emergency" => Ok(Self::Emergency),
            _ => Err(format!("unknown urgency: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Completed,
    Cancelled,
    Expired,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Statuses in which `accepted_by` must be set.
    pub fn has_accepter(&self) -> bool {
        matches!(self, Self::Accepted | Self::Completed)
    }

    /// Manual (administrative) transitions. Acceptance goes through its own path.
    pub fn can_move_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Cancelled)
                | (Self::Pending, Self::Expired)
                | (Self::Accepted, Self::Completed)
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(format!("unknown request status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloodRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub blood_group: BloodGroup,
    pub units_required: i32,
    pub urgency: Urgency,
    pub message: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub needed_by: DateTime<Utc>,
    pub accepted_by: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl BloodRequest {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub requester_id: Uuid,
    pub blood_group: BloodGroup,
    pub units_required: i32,
    pub urgency: Urgency,
    pub message: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub needed_by: DateTime<Utc>,
}

// --- Notification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BloodRequest,
    RequestAccepted,
    RequestCompleted,
    RequestCancelled,
    DonorAvailable,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BloodRequest => "blood_request",
            Self::RequestAccepted => "request_accepted",
            Self::RequestCompleted => "request_completed",
            Self::RequestCancelled => "request_cancelled",
            Self::DonorAvailable => "donor_available",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blood_request" => Ok(Self::BloodRequest),
            "request_accepted" => Ok(Self::RequestAccepted),
            "request_completed" => Ok(Self::RequestCompleted),
            "request_cancelled" => Ok(Self::RequestCancelled),
            "donor_available" => Ok(Self::DonorAvailable),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown notification type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub blood_request_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Created less than a day before `now`.
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_days() < 1
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub blood_request_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn urgency_orders_by_severity() {
        assert!(Urgency::Emergency > Urgency::Urgent);
        assert!(Urgency::Urgent > Urgency::Normal);
        assert_eq!(Urgency::Emergency.color(), "red");
    }

    #[test]
    fn manual_transitions() {
        assert!(RequestStatus::Pending.can_move_to(RequestStatus::Cancelled));
        assert!(RequestStatus::Pending.can_move_to(RequestStatus::Expired));
        assert!(RequestStatus::Accepted.can_move_to(RequestStatus::Completed));
        assert!(!RequestStatus::Pending.can_move_to(RequestStatus::Completed));
        assert!(!RequestStatus::Accepted.can_move_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Completed.can_move_to(RequestStatus::Pending));
    }

    #[test]
    fn active_statuses() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Accepted.is_active());
        assert!(!RequestStatus::Expired.is_active());
    }

    #[test]
    fn enum_strings_parse_back() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
            RequestStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert_eq!("donor_available".parse::<NotificationType>().unwrap(), NotificationType::DonorAvailable);
        assert!("bogus".parse::<Urgency>().is_err());
    }

    #[test]
    fn recent_means_under_a_day() {
        let now = Utc::now();
        let mut n = Notification {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            notification_type: NotificationType::System,
            title: "t".into(),
            message: "m".into(),
            blood_request_id: None,
            is_read: false,
            created_at: now - Duration::hours(23),
        };
        assert!(n.is_recent(now));
        n.created_at = now - Duration::hours(25);
        assert!(!n.is_recent(now));
    }
}
