use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// IPL franchises the prediction backend was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    ChennaiSuperKings,
    RoyalChallengersBengaluru,
    PunjabKings,
    MumbaiIndians,
    KolkataKnightRiders,
    RajasthanRoyals,
    SunrisersHyderabad,
    DelhiCapitals,
    LucknowSuperGiants,
    GujaratTitans,
}

impl Team {
    /// Every team, in the order the form lists them.
    pub const ALL: [Team; 10] = [
        Team::ChennaiSuperKings,
        Team::RoyalChallengersBengaluru,
        Team::PunjabKings,
        Team::MumbaiIndians,
        Team::KolkataKnightRiders,
        Team::RajasthanRoyals,
        Team::SunrisersHyderabad,
        Team::DelhiCapitals,
        Team::LucknowSuperGiants,
        Team::GujaratTitans,
    ];

    /// Display name, which is also the value the backend expects.
    pub fn name(self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::RoyalChallengersBengaluru => "Royal Challengers Bengaluru",
            Team::PunjabKings => "Punjab Kings",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
            Team::DelhiCapitals => "Delhi Capitals",
            Team::LucknowSuperGiants => "Lucknow Super Giants",
            Team::GujaratTitans => "Gujarat Titans",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Team::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown team: {}", wanted))
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_name() {
        assert_eq!("Mumbai Indians".parse::<Team>(), Ok(Team::MumbaiIndians));
    }

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(
            "  gujarat titans ".parse::<Team>(),
            Ok(Team::GujaratTitans)
        );
    }

    #[test]
    fn test_parse_unknown_team() {
        let err = "Deccan Chargers".parse::<Team>().unwrap_err();
        assert_eq!(err, "Unknown team: Deccan Chargers");
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = Team::ALL.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Team::ALL.len());
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&Team::RoyalChallengersBengaluru).unwrap();
        assert_eq!(json, r#""Royal Challengers Bengaluru""#);
        let back: Team = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Team::RoyalChallengersBengaluru);
    }
}
