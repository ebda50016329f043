use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reputation tier. Stored and serialized as its integer value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Rank {
    #[default]
    Pup = 1,
    Beta = 2,
    Alpha = 3,
}

impl Rank {
    pub fn name(self) -> &'static str {
        match self {
            Rank::Pup => "pup",
            Rank::Beta => "beta",
            Rank::Alpha => "alpha",
        }
    }
}

impl From<Rank> for i16 {
    fn from(rank: Rank) -> Self {
        rank as i16
    }
}

impl TryFrom<i16> for Rank {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rank::Pup),
            2 => Ok(Rank::Beta),
            3 => Ok(Rank::Alpha),
            other => Err(format!("unknown rank {other}")),
        }
    }
}

/// Ranking record embedded in every user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub rank: Rank,
    pub is_top_alpha: bool,
    /// Only meaningful while `is_top_alpha` is set.
    pub num_incidents: i64,
    /// `None` until the ranking is computed for the first time.
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Unsafe,
    Unknown,
}

impl SafetyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Warning => "warning",
            SafetyLevel::Unsafe => "unsafe",
            SafetyLevel::Unknown => "unknown",
        }
    }
}

/// Safety classification computed for a coordinate. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRanking {
    pub average: f64,
    pub text: SafetyLevel,
    pub num_incidents: u32,
}

impl LocationRanking {
    pub fn safe() -> Self {
        Self {
            average: 0.0,
            text: SafetyLevel::Safe,
            num_incidents: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Rank::Beta).unwrap(), "2");
        assert_eq!(serde_json::from_str::<Rank>("3").unwrap(), Rank::Alpha);
        assert!(serde_json::from_str::<Rank>("7").is_err());
    }

    #[test]
    fn location_ranking_uses_wire_names() {
        let json = serde_json::to_value(LocationRanking::safe()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "average": 0.0, "text": "safe", "numIncidents": 0 })
        );
    }
}
