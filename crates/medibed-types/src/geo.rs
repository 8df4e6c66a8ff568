//! Geographic points and supported city centers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Cities the service is deployed in.
///
/// Patients without device geolocation pick one of these and are placed at
/// its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Hyderabad,
    Bangalore,
    Chennai,
    Mumbai,
    Delhi,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Hyderabad,
        City::Bangalore,
        City::Chennai,
        City::Mumbai,
        City::Delhi,
    ];

    pub fn center(&self) -> GeoPoint {
        match self {
            City::Hyderabad => GeoPoint::new(17.385, 78.4867),
            City::Bangalore => GeoPoint::new(12.9716, 77.5946),
            City::Chennai => GeoPoint::new(13.0827, 80.2707),
            City::Mumbai => GeoPoint::new(19.076, 72.8777),
            City::Delhi => GeoPoint::new(28.6139, 77.209),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            City::Hyderabad => "Hyderabad",
            City::Bangalore => "Bangalore",
            City::Chennai => "Chennai",
            City::Mumbai => "Mumbai",
            City::Delhi => "Delhi",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown city '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_parse_is_case_insensitive() {
        assert_eq!("mumbai".parse::<City>(), Ok(City::Mumbai));
        assert_eq!(" Delhi ".parse::<City>(), Ok(City::Delhi));
        assert!("Pune".parse::<City>().is_err());
    }

    #[test]
    fn test_default_map_center_is_hyderabad() {
        let c = City::Hyderabad.center();
        assert_eq!(c, GeoPoint::new(17.385, 78.4867));
        assert_eq!(c.to_string(), "17.3850, 78.4867");
    }
}
