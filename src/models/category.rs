use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of stay a listing offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Trending,
    Rooms,
    IconicCities,
    Mountains,
    Castles,
    Pools,
    Camping,
    Arctic,
    Forests,
    #[default]
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Trending,
        Category::Rooms,
        Category::IconicCities,
        Category::Mountains,
        Category::Castles,
        Category::Pools,
        Category::Camping,
        Category::Arctic,
        Category::Forests,
        Category::Miscellaneous,
    ];

    /// Lower-case name used for storage and filter comparison
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::Rooms => "rooms",
            Category::IconicCities => "iconic cities",
            Category::Mountains => "mountains",
            Category::Castles => "castles",
            Category::Pools => "pools",
            Category::Camping => "camping",
            Category::Arctic => "arctic",
            Category::Forests => "forests",
            Category::Miscellaneous => "miscellaneous",
        }
    }

    /// Comma-separated list of every category, as shown to users and the model
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Pools".parse::<Category>().unwrap(), Category::Pools);
        assert_eq!(
            "  ICONIC Cities ".parse::<Category>().unwrap(),
            Category::IconicCities
        );
    }

    #[test]
    fn rejects_values_outside_the_enumeration() {
        for bad in ["beach", "", "pool", "castle s"] {
            assert!(bad.parse::<Category>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn serializes_as_lower_case_name() {
        let json = serde_json::to_string(&Category::IconicCities).unwrap();
        assert_eq!(json, "\"iconic cities\"");
        let back: Category = serde_json::from_str("\"Mountains\"").unwrap();
        assert_eq!(back, Category::Mountains);
    }
}
