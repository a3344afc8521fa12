use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Host cities seen in the historical match data. "Bangalore" and "Bengaluru"
/// are both kept because the backend encodes them separately.
const CITY_NAMES: [&str; 33] = [
    "Bangalore",
    "Chandigarh",
    "Delhi",
    "Mumbai",
    "Kolkata",
    "Jaipur",
    "Hyderabad",
    "Chennai",
    "Cape Town",
    "Port Elizabeth",
    "Durban",
    "Centurion",
    "East London",
    "Johannesburg",
    "Kimberley",
    "Bloemfontein",
    "Ahmedabad",
    "Cuttack",
    "Nagpur",
    "Dharamsala",
    "Visakhapatnam",
    "Pune",
    "Raipur",
    "Ranchi",
    "Abu Dhabi",
    "Bengaluru",
    "Indore",
    "Dubai",
    "Sharjah",
    "Navi Mumbai",
    "Lucknow",
    "Guwahati",
    "Mohali",
];

/// A venue city from the fixed list the form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct City(&'static str);

impl City {
    /// Every city, in display order.
    pub fn all() -> impl Iterator<Item = City> {
        CITY_NAMES.iter().copied().map(City)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        City::all()
            .find(|c| c.0.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown city: {}", wanted))
    }
}

impl Serialize for City {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for City {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_count() {
        assert_eq!(City::all().count(), 33);
    }

    #[test]
    fn test_parse_city() {
        let c: City = "navi mumbai".parse().unwrap();
        assert_eq!(c.name(), "Navi Mumbai");
    }

    #[test]
    fn test_bangalore_and_bengaluru_are_distinct() {
        let a: City = "Bangalore".parse().unwrap();
        let b: City = "Bengaluru".parse().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_city() {
        assert_eq!(
            "Lahore".parse::<City>().unwrap_err(),
            "Unknown city: Lahore"
        );
    }
}
