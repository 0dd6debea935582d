//! Persistence boundary.
//!
//! Services only talk to [`BloodBankStore`]. `PgStore` backs the running
//! service; `MemoryStore` backs tests and local experiments.

mod memory;
mod pg;
mod rows;

pub use memory::MemoryStore;
pub use pg::PgStore;

use uuid::Uuid;

use bloodbank_shared::errors::AppResult;
use bloodbank_shared::types::BloodGroup;

use crate::models::{
    BloodRequest, Identity, NewBloodRequest, NewIdentity, NewNotification, NewUserProfile,
    Notification, UserProfile,
};

/// Create/read/filter/update over identities, profiles, requests and notifications.
///
/// Every method is a single independent write or read; nothing here spans a
/// transaction.
pub trait BloodBankStore: Send + Sync {
    fn ping(&self) -> AppResult<()>;

    // --- identities ---
    fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>>;
    fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>>;
    fn insert_identity(&self, new: NewIdentity) -> AppResult<Identity>;
    fn update_identity(&self, identity: &Identity) -> AppResult<Identity>;

    // --- profiles ---
    fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
    fn insert_profile(&self, new: NewUserProfile) -> AppResult<UserProfile>;
    fn update_profile(&self, profile: &UserProfile) -> AppResult<UserProfile>;
    /// Profiles with `is_donor` and `is_available` set, optionally of one group.
    fn available_donors(&self, blood_group: Option<BloodGroup>) -> AppResult<Vec<UserProfile>>;

    // --- blood requests ---
    fn insert_request(&self, new: NewBloodRequest) -> AppResult<BloodRequest>;
    fn find_request(&self, id: Uuid) -> AppResult<Option<BloodRequest>>;
    fn update_request(&self, request: &BloodRequest) -> AppResult<BloodRequest>;
    /// Pending requests of a group, oldest first.
    fn pending_requests(&self, blood_group: BloodGroup) -> AppResult<Vec<BloodRequest>>;
    /// A requester's requests, newest first.
    fn requests_by_requester(&self, requester_id: Uuid, limit: Option<i64>) -> AppResult<Vec<BloodRequest>>;

    // --- notifications ---
    fn insert_notification(&self, new: NewNotification) -> AppResult<Notification>;
    /// One page of a user's notifications, newest first, plus the total count.
    fn list_notifications(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<(Vec<Notification>, i64)>;
    fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;
    fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize>;
    /// `None` when the notification does not exist or belongs to someone else.
    fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>>;
}
