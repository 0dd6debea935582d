//! Sample donors for local testing.

use chrono::NaiveDate;
use uuid::Uuid;

use bloodbank_shared::errors::{AppError, AppResult};
use bloodbank_shared::types::BloodGroup;

use crate::geo::Geocoder;
use crate::services::profile_service::{self, RegisterProfile};
use crate::store::BloodBankStore;

pub struct SampleDonor {
    pub username: &'static str,
    pub blood_group: BloodGroup,
    pub phone: &'static str,
    pub address: &'static str,
}

pub const SAMPLE_DONORS: [SampleDonor; 7] = [
    SampleDonor { username: "tasnim_tayeba", blood_group: BloodGroup::APositive, phone: "0123456789", address: "UAP Campus, Dhaka" },
    SampleDonor { username: "joynove_mim", blood_group: BloodGroup::OPositive, phone: "0123456790", address: "Mirpur, Dhaka" },
    SampleDonor { username: "fabia_rahman", blood_group: BloodGroup::BPositive, phone: "0123456791", address: "Dhanmondi, Dhaka" },
    SampleDonor { username: "shahriar_saad", blood_group: BloodGroup::APositive, phone: "0123456792", address: "UAP Campus, Dhaka" },
    SampleDonor { username: "samia_zaman", blood_group: BloodGroup::BNegative, phone: "0123456793", address: "Gulshan, Dhaka" },
    SampleDonor { username: "nabil_hossain", blood_group: BloodGroup::OPositive, phone: "0123456794", address: "Banani, Dhaka" },
    SampleDonor { username: "robayet_ismum", blood_group: BloodGroup::OPositive, phone: "0123456795", address: "Uttara, Dhaka" },
];

/// Insert the sample donors, skipping usernames that already exist.
/// Returns how many were created.
pub fn seed_sample_donors(store: &dyn BloodBankStore, geocoder: &dyn Geocoder) -> AppResult<usize> {
    let date_of_birth = NaiveDate::from_ymd_opt(1998, 1, 1)
        .ok_or_else(|| AppError::internal("invalid sample date of birth"))?;

    let mut created = 0;
    for donor in &SAMPLE_DONORS {
        if store.find_identity_by_username(donor.username)?.is_some() {
            tracing::debug!(username = donor.username, "sample donor exists, skipping");
            continue;
        }

        let profile = profile_service::register_profile(
            store,
            geocoder,
            Uuid::now_v7(),
            RegisterProfile {
                username: Some(donor.username.to_string()),
                email: Some(format!("{}@uap.edu.bd", donor.username)),
                first_name: String::new(),
                last_name: String::new(),
                blood_group: donor.blood_group,
                phone: donor.phone.to_string(),
                address: donor.address.to_string(),
                date_of_birth,
            },
        )?;

        tracing::info!(username = donor.username, profile_id = %profile.id, "created donor");
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::StaticGeocoder;
    use crate::store::MemoryStore;

    #[test]
    fn seeding_twice_creates_once() {
        let store = MemoryStore::new();
        let geocoder = StaticGeocoder::default();

        assert_eq!(seed_sample_donors(&store, &geocoder).unwrap(), 7);
        assert_eq!(seed_sample_donors(&store, &geocoder).unwrap(), 0);

        let o_positive = store.available_donors(Some(BloodGroup::OPositive)).unwrap();
        assert_eq!(o_positive.len(), 3);

        let nabil = store.find_identity_by_username("nabil_hossain").unwrap().unwrap();
        assert_eq!(nabil.email, "nabil_hossain@uap.edu.bd");
        let profile = store.find_profile(nabil.id).unwrap().unwrap();
        assert_eq!(profile.coordinates(), Some((23.7940, 90.4054)));
    }
}
