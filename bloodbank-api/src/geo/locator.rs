use serde::Serialize;

use bloodbank_shared::types::BloodGroup;

use crate::geo::distance::haversine_km;
use crate::models::UserProfile;

/// A donor within the search radius and its distance from the search origin.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyDonor {
    pub profile: UserProfile,
    pub distance_km: f64,
}

/// Donors within `max_distance_km` of `(lat, lon)`, nearest first.
///
/// Only donors that are flagged as donors, currently available and carry both
/// coordinates are considered. Linear scan; there is no spatial index.
pub fn nearby_donors<'a, I>(
    donors: I,
    lat: f64,
    lon: f64,
    max_distance_km: f64,
    blood_group: Option<BloodGroup>,
) -> Vec<NearbyDonor>
where
    I: IntoIterator<Item = &'a UserProfile>,
{
    let mut nearby: Vec<NearbyDonor> = donors
        .into_iter()
        .filter(|p| p.is_eligible_donor())
        .filter(|p| blood_group.map_or(true, |g| p.blood_group == g))
        .filter_map(|p| {
            let (d_lat, d_lon) = p.coordinates()?;
            let distance_km = haversine_km(lat, lon, d_lat, d_lon);
            (distance_km <= max_distance_km).then(|| NearbyDonor {
                profile: p.clone(),
                distance_km,
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn donor(group: BloodGroup, coords: Option<(f64, f64)>, available: bool) -> UserProfile {
        UserProfile {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            blood_group: group,
            phone: "0123456789".into(),
            address: "Dhaka".into(),
            date_of_birth: None,
            is_donor: true,
            is_available: available,
            last_donation_date: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            created_at: Utc::now(),
        }
    }

    const CAMPUS: (f64, f64) = (23.8151, 90.4255);
    const GULSHAN: (f64, f64) = (23.7940, 90.4154);
    const BANANI: (f64, f64) = (23.7940, 90.4054);
    const UTTARA: (f64, f64) = (23.8759, 90.3795);

    #[test]
    fn sorted_and_within_radius() {
        let donors = vec![
            donor(BloodGroup::OPositive, Some(UTTARA), true),
            donor(BloodGroup::OPositive, Some(BANANI), true),
            donor(BloodGroup::APositive, Some(CAMPUS), true),
            donor(BloodGroup::OPositive, Some(GULSHAN), true),
        ];

        let found = nearby_donors(&donors, CAMPUS.0, CAMPUS.1, 5.0, None);
        assert_eq!(found.len(), 3, "uttara is ~8 km out");
        assert!(found.iter().all(|d| d.distance_km <= 5.0));
        assert!(found.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(found[0].distance_km, 0.0);
        assert_eq!(found[0].profile.blood_group, BloodGroup::APositive);
    }

    #[test]
    fn blood_group_filter_is_exact() {
        let donors = vec![
            donor(BloodGroup::OPositive, Some(CAMPUS), true),
            donor(BloodGroup::ONegative, Some(CAMPUS), true),
        ];
        let found = nearby_donors(&donors, CAMPUS.0, CAMPUS.1, 1.0, Some(BloodGroup::ONegative));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.blood_group, BloodGroup::ONegative);
    }

    #[test]
    fn unavailable_non_donor_and_unlocated_are_skipped() {
        let mut not_donor = donor(BloodGroup::OPositive, Some(CAMPUS), true);
        not_donor.is_donor = false;
        let donors = vec![
            donor(BloodGroup::OPositive, Some(CAMPUS), false),
            donor(BloodGroup::OPositive, None, true),
            not_donor,
        ];
        assert!(nearby_donors(&donors, CAMPUS.0, CAMPUS.1, 100.0, Some(BloodGroup::OPositive)).is_empty());
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let donors = vec![donor(BloodGroup::BPositive, Some(GULSHAN), true)];
        let exact = haversine_km(CAMPUS.0, CAMPUS.1, GULSHAN.0, GULSHAN.1);
        assert_eq!(nearby_donors(&donors, CAMPUS.0, CAMPUS.1, exact, None).len(), 1);
        assert!(nearby_donors(&donors, CAMPUS.0, CAMPUS.1, exact - 1e-6, None).is_empty());
    }
}
