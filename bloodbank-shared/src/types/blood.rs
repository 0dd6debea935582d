use serde::{Deserialize, Serialize};

/// ABO/Rh blood group. Serialized with its conventional label ("AB-").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::OPositive,
        Self::ONegative,
        Self::AbPositive,
        Self::AbNegative,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|g| g.label() == wanted)
            .ok_or_else(|| format!("unknown blood group: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back() {
        for group in BloodGroup::ALL {
            assert_eq!(group.label().parse::<BloodGroup>().unwrap(), group);
        }
        assert_eq!(" ab- ".parse::<BloodGroup>().unwrap(), BloodGroup::AbNegative);
        assert!("C+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&BloodGroup::OPositive).unwrap();
        assert_eq!(json, "\"O+\"");
        let group: BloodGroup = serde_json::from_str("\"AB+\"").unwrap();
        assert_eq!(group, BloodGroup::AbPositive);
    }
}
