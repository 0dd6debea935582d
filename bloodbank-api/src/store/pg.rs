use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use uuid::Uuid;

use bloodbank_shared::clients::db::DbPool;
use bloodbank_shared::errors::{AppError, AppResult};
use bloodbank_shared::types::BloodGroup;

use crate::models::{
    BloodRequest, Identity, NewBloodRequest, NewIdentity, NewNotification, NewUserProfile,
    Notification, RequestStatus, UserProfile,
};
use crate::schema::{blood_requests, notifications, profiles, users};

use super::rows::{
    convert_all, BloodRequestRow, IdentityRow, NewBloodRequestRow, NewIdentityRow,
    NewNotificationRow, NewProfileRow, NotificationRow, ProfileRow,
};
use super::BloodBankStore;

/// PostgreSQL store over an r2d2 pool. Calls block the current thread.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            AppError::internal("database connection error")
        })
    }
}

impl BloodBankStore for PgStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>> {
        let mut conn = self.conn()?;
        let row = users::table
            .find(id)
            .first::<IdentityRow>(&mut conn)
            .optional()?;
        Ok(row.map(Identity::from))
    }

    fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        let mut conn = self.conn()?;
        let row = users::table
            .filter(users::username.eq(username))
            .first::<IdentityRow>(&mut conn)
            .optional()?;
        Ok(row.map(Identity::from))
    }

    fn insert_identity(&self, new: NewIdentity) -> AppResult<Identity> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(users::table)
            .values(&NewIdentityRow::from(new))
            .get_result::<IdentityRow>(&mut conn)?;
        Ok(row.into())
    }

    fn update_identity(&self, identity: &Identity) -> AppResult<Identity> {
        let mut conn = self.conn()?;
        let row = diesel::update(users::table.find(identity.id))
            .set((
                users::email.eq(&identity.email),
                users::first_name.eq(&identity.first_name),
                users::last_name.eq(&identity.last_name),
            ))
            .get_result::<IdentityRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let mut conn = self.conn()?;
        profiles::table
            .filter(profiles::user_id.eq(user_id))
            .first::<ProfileRow>(&mut conn)
            .optional()?
            .map(UserProfile::try_from)
            .transpose()
    }

    fn insert_profile(&self, new: NewUserProfile) -> AppResult<UserProfile> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(profiles::table)
            .values(&NewProfileRow::from(new))
            .get_result::<ProfileRow>(&mut conn)?;
        row.try_into()
    }

    fn update_profile(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let mut conn = self.conn()?;
        let row = diesel::update(profiles::table.find(profile.id))
            .set((
                profiles::blood_group.eq(profile.blood_group.label()),
                profiles::phone.eq(&profile.phone),
                profiles::address.eq(&profile.address),
                profiles::date_of_birth.eq(profile.date_of_birth),
                profiles::is_donor.eq(profile.is_donor),
                profiles::is_available.eq(profile.is_available),
                profiles::last_donation_date.eq(profile.last_donation_date),
                profiles::latitude.eq(profile.latitude),
                profiles::longitude.eq(profile.longitude),
            ))
            .get_result::<ProfileRow>(&mut conn)?;
        row.try_into()
    }

    fn available_donors(&self, blood_group: Option<BloodGroup>) -> AppResult<Vec<UserProfile>> {
        let mut conn = self.conn()?;
        let mut query = profiles::table
            .filter(profiles::is_donor.eq(true))
            .filter(profiles::is_available.eq(true))
            .order(profiles::created_at.asc())
            .into_boxed();
        if let Some(group) = blood_group {
            query = query.filter(profiles::blood_group.eq(group.label()));
        }
        convert_all(query.load::<ProfileRow>(&mut conn)?)
    }

    fn insert_request(&self, new: NewBloodRequest) -> AppResult<BloodRequest> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(blood_requests::table)
            .values(&NewBloodRequestRow::from(new))
            .get_result::<BloodRequestRow>(&mut conn)?;
        row.try_into()
    }

    fn find_request(&self, id: Uuid) -> AppResult<Option<BloodRequest>> {
        let mut conn = self.conn()?;
        blood_requests::table
            .find(id)
            .first::<BloodRequestRow>(&mut conn)
            .optional()?
            .map(BloodRequest::try_from)
            .transpose()
    }

    fn update_request(&self, request: &BloodRequest) -> AppResult<BloodRequest> {
        let mut conn = self.conn()?;
        let row = diesel::update(blood_requests::table.find(request.id))
            .set((
                blood_requests::status.eq(request.status.as_str()),
                blood_requests::accepted_by.eq(request.accepted_by),
                blood_requests::accepted_at.eq(request.accepted_at),
            ))
            .get_result::<BloodRequestRow>(&mut conn)?;
        row.try_into()
    }

    fn pending_requests(&self, blood_group: BloodGroup) -> AppResult<Vec<BloodRequest>> {
        let mut conn = self.conn()?;
        let rows = blood_requests::table
            .filter(blood_requests::blood_group.eq(blood_group.label()))
            .filter(blood_requests::status.eq(RequestStatus::Pending.as_str()))
            .order(blood_requests::created_at.asc())
            .load::<BloodRequestRow>(&mut conn)?;
        convert_all(rows)
    }

    fn requests_by_requester(&self, requester_id: Uuid, limit: Option<i64>) -> AppResult<Vec<BloodRequest>> {
        let mut conn = self.conn()?;
        let mut query = blood_requests::table
            .filter(blood_requests::requester_id.eq(requester_id))
            .order(blood_requests::created_at.desc())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        convert_all(query.load::<BloodRequestRow>(&mut conn)?)
    }

    fn insert_notification(&self, new: NewNotification) -> AppResult<Notification> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(notifications::table)
            .values(&NewNotificationRow::from(new))
            .get_result::<NotificationRow>(&mut conn)?;
        row.try_into()
    }

    fn list_notifications(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<(Vec<Notification>, i64)> {
        let mut conn = self.conn()?;

        let total: i64 = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;

        let rows = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<NotificationRow>(&mut conn)?;

        Ok((convert_all(rows)?, total))
    }

    fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        let count: i64 = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }

    fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        let mut conn = self.conn()?;
        diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .get_result::<NotificationRow>(&mut conn)
        .optional()?
        .map(Notification::try_from)
        .transpose()
    }
}
