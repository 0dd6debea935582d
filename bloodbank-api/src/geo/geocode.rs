use bloodbank_shared::errors::AppResult;

/// UAP campus, Kuratoli.
pub const CAMPUS: (f64, f64) = (23.8151, 90.4255);

/// Resolves free-text addresses to `(latitude, longitude)`.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> AppResult<(f64, f64)>;
}

/// Lookup over a handful of known Dhaka neighbourhoods.
///
/// Matches the first known name contained in the lower-cased address and
/// falls back to `default` when nothing matches.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    locations: Vec<(&'static str, (f64, f64))>,
    default: (f64, f64),
}

impl StaticGeocoder {
    pub fn new(default: (f64, f64)) -> Self {
        Self {
            locations: vec![
                ("uap campus", CAMPUS),
                ("kuratoli", CAMPUS),
                ("mirpur", (23.8067, 90.3683)),
                ("dhanmondi", (23.7465, 90.3760)),
                ("gulshan", (23.7940, 90.4154)),
                ("banani", (23.7940, 90.4054)),
                ("uttara", (23.8759, 90.3795)),
            ],
            default,
        }
    }

    pub fn lookup(&self, address: &str) -> (f64, f64) {
        let address = address.to_lowercase();
        self.locations
            .iter()
            .find(|(name, _)| address.contains(name))
            .map(|(_, coords)| *coords)
            .unwrap_or(self.default)
    }
}

impl Default for StaticGeocoder {
    fn default() -> Self {
        Self::new(CAMPUS)
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> AppResult<(f64, f64)> {
        let coords = self.lookup(address);
        tracing::debug!(address = %address, lat = coords.0, lon = coords.1, "address geocoded");
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_areas_case_insensitive() {
        let geocoder = StaticGeocoder::default();
        assert_eq!(geocoder.lookup("House 12, MIRPUR-10, Dhaka"), (23.8067, 90.3683));
        assert_eq!(geocoder.lookup("Road 27, Dhanmondi"), (23.7465, 90.3760));
        assert_eq!(geocoder.lookup("Sector 7, Uttara"), (23.8759, 90.3795));
        assert_eq!(geocoder.lookup("UAP Campus, Dhaka"), CAMPUS);
    }

    #[test]
    fn unknown_address_falls_back_to_default() {
        assert_eq!(StaticGeocoder::default().lookup("Chittagong"), CAMPUS);

        let geocoder = StaticGeocoder::new((1.0, 2.0));
        assert_eq!(geocoder.geocode("nowhere in particular").unwrap(), (1.0, 2.0));
    }

    #[test]
    fn first_listed_match_wins() {
        // both "gulshan" and "banani" appear; gulshan is listed first
        assert_eq!(StaticGeocoder::default().lookup("Banani near Gulshan 2"), (23.7940, 90.4154));
    }
}
