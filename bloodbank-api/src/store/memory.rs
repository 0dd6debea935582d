use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use bloodbank_shared::errors::{AppError, AppResult};
use bloodbank_shared::types::BloodGroup;

use crate::models::{
    BloodRequest, Identity, NewBloodRequest, NewIdentity, NewNotification, NewUserProfile,
    Notification, RequestStatus, UserProfile,
};

use super::BloodBankStore;

#[derive(Default)]
struct Tables {
    identities: Vec<Identity>,
    profiles: Vec<UserProfile>,
    requests: Vec<BloodRequest>,
    notifications: Vec<Notification>,
}

/// Process-local store. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }

    /// Every stored notification, oldest first.
    pub fn all_notifications(&self) -> AppResult<Vec<Notification>> {
        Ok(self.tables()?.notifications.clone())
    }
}

impl BloodBankStore for MemoryStore {
    fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }

    fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.tables()?.identities.iter().find(|i| i.id == id).cloned())
    }

    fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        Ok(self
            .tables()?
            .identities
            .iter()
            .find(|i| i.username == username)
            .cloned())
    }

    fn insert_identity(&self, new: NewIdentity) -> AppResult<Identity> {
        let mut tables = self.tables()?;
        if tables.identities.iter().any(|i| i.id == new.id || i.username == new.username) {
            return Err(AppError::bad_request("identity already exists"));
        }
        let identity = Identity {
            id: new.id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            created_at: Utc::now(),
        };
        tables.identities.push(identity.clone());
        Ok(identity)
    }

    fn update_identity(&self, identity: &Identity) -> AppResult<Identity> {
        let mut tables = self.tables()?;
        let slot = tables
            .identities
            .iter_mut()
            .find(|i| i.id == identity.id)
            .ok_or_else(|| AppError::not_found("identity not found"))?;
        *slot = identity.clone();
        Ok(identity.clone())
    }

    fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self
            .tables()?
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    fn insert_profile(&self, new: NewUserProfile) -> AppResult<UserProfile> {
        let mut tables = self.tables()?;
        if tables.profiles.iter().any(|p| p.user_id == new.user_id) {
            return Err(AppError::bad_request("profile already exists"));
        }
        let profile = UserProfile {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            blood_group: new.blood_group,
            phone: new.phone,
            address: new.address,
            date_of_birth: new.date_of_birth,
            is_donor: new.is_donor,
            is_available: new.is_available,
            last_donation_date: None,
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: Utc::now(),
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    fn update_profile(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let mut tables = self.tables()?;
        let slot = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| AppError::not_found("profile not found"))?;
        *slot = profile.clone();
        Ok(profile.clone())
    }

    fn available_donors(&self, blood_group: Option<BloodGroup>) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .tables()?
            .profiles
            .iter()
            .filter(|p| p.is_eligible_donor())
            .filter(|p| blood_group.map_or(true, |g| p.blood_group == g))
            .cloned()
            .collect())
    }

    fn insert_request(&self, new: NewBloodRequest) -> AppResult<BloodRequest> {
        let request = BloodRequest {
            id: Uuid::now_v7(),
            requester_id: new.requester_id,
            blood_group: new.blood_group,
            units_required: new.units_required,
            urgency: new.urgency,
            message: new.message,
            hospital_name: new.hospital_name,
            hospital_address: new.hospital_address,
            contact_person: new.contact_person,
            contact_phone: new.contact_phone,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            needed_by: new.needed_by,
            accepted_by: None,
            accepted_at: None,
        };
        self.tables()?.requests.push(request.clone());
        Ok(request)
    }

    fn find_request(&self, id: Uuid) -> AppResult<Option<BloodRequest>> {
        Ok(self.tables()?.requests.iter().find(|r| r.id == id).cloned())
    }

    fn update_request(&self, request: &BloodRequest) -> AppResult<BloodRequest> {
        let mut tables = self.tables()?;
        let slot = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| AppError::not_found("blood request not found"))?;
        *slot = request.clone();
        Ok(request.clone())
    }

    fn pending_requests(&self, blood_group: BloodGroup) -> AppResult<Vec<BloodRequest>> {
        Ok(self
            .tables()?
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending && r.blood_group == blood_group)
            .cloned()
            .collect())
    }

    fn requests_by_requester(&self, requester_id: Uuid, limit: Option<i64>) -> AppResult<Vec<BloodRequest>> {
        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(self
            .tables()?
            .requests
            .iter()
            .rev()
            .filter(|r| r.requester_id == requester_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn insert_notification(&self, new: NewNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            notification_type: new.notification_type,
            title: new.title,
            message: new.message,
            blood_request_id: new.blood_request_id,
            is_read: false,
            created_at: Utc::now(),
        };
        self.tables()?.notifications.push(notification.clone());
        Ok(notification)
    }

    fn list_notifications(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<(Vec<Notification>, i64)> {
        let tables = self.tables()?;
        let mine: Vec<&Notification> = tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .collect();
        let total = mine.len() as i64;
        let items = mine
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .tables()?
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize> {
        let mut tables = self.tables()?;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        let mut tables = self.tables()?;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    fn note(user_id: Uuid, title: &str) -> NewNotification {
        NewNotification {
            user_id,
            notification_type: NotificationType::System,
            title: title.into(),
            message: "hello".into(),
            blood_request_id: None,
        }
    }

    #[test]
    fn notifications_list_newest_first_with_paging() {
        let store = MemoryStore::new();
        let user = Uuid::now_v7();
        let other = Uuid::now_v7();
        for i in 0..5 {
            store.insert_notification(note(user, &format!("n{i}"))).unwrap();
        }
        store.insert_notification(note(other, "theirs")).unwrap();

        let (items, total) = store.list_notifications(user, 2, 1).unwrap();
        assert_eq!(total, 5);
        let titles: Vec<_> = items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["n3", "n2"]);
    }

    #[test]
    fn mark_read_only_touches_owner() {
        let store = MemoryStore::new();
        let user = Uuid::now_v7();
        let n = store.insert_notification(note(user, "mine")).unwrap();

        assert!(store.mark_read(n.id, Uuid::now_v7()).unwrap().is_none());
        assert_eq!(store.count_unread(user).unwrap(), 1);

        let read = store.mark_read(n.id, user).unwrap().unwrap();
        assert!(read.is_read);
        assert_eq!(store.count_unread(user).unwrap(), 0);
        assert_eq!(store.mark_all_read(user).unwrap(), 0);
    }

    #[test]
    fn duplicate_profile_is_rejected() {
        let store = MemoryStore::new();
        let new = NewUserProfile {
            user_id: Uuid::now_v7(),
            blood_group: BloodGroup::BNegative,
            phone: "0123456793".into(),
            address: "Gulshan, Dhaka".into(),
            date_of_birth: None,
            is_donor: true,
            is_available: true,
            latitude: None,
            longitude: None,
        };
        store.insert_profile(new.clone()).unwrap();
        assert!(store.insert_profile(new).is_err());
    }
}
