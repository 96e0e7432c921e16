// ── Location estimate ──
//
// The resolver's output. Unset text fields are empty strings and unset
// coordinates are zero, so a genuine fix at 0,0 reads as "unknown".

use locus_api::{IpLocation, Place};
use strum::Display;

/// Which resolution path produced the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum LocationSource {
    #[strum(serialize = "GPS")]
    Gps,
    #[strum(serialize = "IP")]
    Ip,
    /// Every path failed.
    #[default]
    #[strum(serialize = "none")]
    Unresolved,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationEstimate {
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius; zero when the fix did not come from a device.
    pub accuracy_meters: f64,
    pub source: LocationSource,
}

impl LocationEstimate {
    /// Estimate built entirely from an IP lookup.
    pub fn from_ip(loc: &IpLocation) -> Self {
        Self {
            country_code: loc.country_code.clone(),
            country_name: loc.country_name.clone(),
            region_name: loc.region_name.clone(),
            city_name: loc.city_name.clone(),
            latitude: loc.latitude,
            longitude: loc.longitude,
            accuracy_meters: 0.0,
            source: LocationSource::Ip,
        }
    }

    /// Copy administrative names from a reverse-geocoded place.
    pub fn set_place(&mut self, place: Place) {
        self.country_code = place.country_code;
        self.country_name = place.country_name;
        self.region_name = place.region_name;
        self.city_name = place.city_name;
    }

    /// Both coordinates are exactly zero.
    pub fn lacks_coordinates(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Fill whatever is still unset from an IP lookup.
    ///
    /// Names are filled one by one; coordinates only as a pair, and only
    /// when both are zero. `source` is left alone.
    pub fn backfill_from(&mut self, loc: &IpLocation) {
        fill_if_empty(&mut self.country_code, &loc.country_code);
        fill_if_empty(&mut self.country_name, &loc.country_name);
        fill_if_empty(&mut self.region_name, &loc.region_name);
        fill_if_empty(&mut self.city_name, &loc.city_name);

        if self.lacks_coordinates() {
            self.latitude = loc.latitude;
            self.longitude = loc.longitude;
        }
    }
}

fn fill_if_empty(field: &mut String, candidate: &str) {
    if field.is_empty() {
        candidate.clone_into(field);
    }
}
