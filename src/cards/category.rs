use std::fmt;

use serde::{Deserialize, Serialize};

/// Five training facilities in table order.
pub const FACILITY_COUNT: usize = 5;

/// Preferred training category of a support card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Speed,
    Stamina,
    Power,
    Guts,
    Wit,
    Support,
    Unknown,
}

impl CardCategory {
    pub const FACILITIES: [CardCategory; FACILITY_COUNT] = [
        CardCategory::Speed,
        CardCategory::Stamina,
        CardCategory::Power,
        CardCategory::Guts,
        CardCategory::Wit,
    ];

    /// Parses the dataset's `prefered_type`. "Intelligence" is the Wit facility.
    pub fn from_preferred_type(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Speed") => Self::Speed,
            Some("Stamina") => Self::Stamina,
            Some("Power") => Self::Power,
            Some("Guts") => Self::Guts,
            Some("Intelligence") | Some("Wit") => Self::Wit,
            Some("Support") | Some("Friend") | Some("Group") => Self::Support,
            _ => Self::Unknown,
        }
    }

    /// Facility index for training categories; `None` for Support/Unknown.
    pub fn facility_index(self) -> Option<usize> {
        match self {
            Self::Speed => Some(0),
            Self::Stamina => Some(1),
            Self::Power => Some(2),
            Self::Guts => Some(3),
            Self::Wit => Some(4),
            Self::Support | Self::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "Speed",
            Self::Stamina => "Stamina",
            Self::Power => "Power",
            Self::Guts => "Guts",
            Self::Wit => "Wit",
            Self::Support => "Support",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::CardCategory;

    #[test]
    fn intelligence_maps_to_wit_facility() {
        let category = CardCategory::from_preferred_type(Some("Intelligence"));
        assert_eq!(category, CardCategory::Wit);
        assert_eq!(category.facility_index(), Some(4));
        assert_eq!(CardCategory::from_preferred_type(None), CardCategory::Unknown);
        assert_eq!(CardCategory::Support.facility_index(), None);
    }
}
