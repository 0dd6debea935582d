//! Geographic helpers: great-circle distance, address geocoding and the
//! nearby-donor search built on both.

pub mod distance;
pub mod geocode;
pub mod locator;

pub use distance::haversine_km;
pub use geocode::{Geocoder, StaticGeocoder, CAMPUS};
pub use locator::{nearby_donors, NearbyDonor};
