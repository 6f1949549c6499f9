//! Common Types Module
//!
//! Closed domain enums shared across the query normalizer, scoring engine
//! and persistence layer. Every enum here is a closed vocabulary: unknown
//! strings are rejected at the parse boundary, never coerced to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Experience band of a candidate.
///
/// Ordinal: `Entry` < `Junior` < `Mid` < `Senior` < `Lead` < `Executive`.
/// The ordinal is used by the `experience` sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "experience_level", rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    /// Ordinal rank for sorting (higher = more senior).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Entry => 0,
            Self::Junior => 1,
            Self::Mid => 2,
            Self::Senior => 3,
            Self::Lead => 4,
            Self::Executive => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(Self::Entry),
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "lead" => Ok(Self::Lead),
            "executive" => Ok(Self::Executive),
            other => Err(format!("unknown experience level '{}'", other)),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote-work preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "remote_preference", rename_all = "snake_case")]
pub enum RemotePreference {
    Remote,
    Hybrid,
    Onsite,
    Flexible,
}

impl RemotePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
            Self::Onsite => "onsite",
            Self::Flexible => "flexible",
        }
    }
}

impl FromStr for RemotePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(Self::Remote),
            "hybrid" => Ok(Self::Hybrid),
            "onsite" => Ok(Self::Onsite),
            "flexible" => Ok(Self::Flexible),
            other => Err(format!("unknown remote preference '{}'", other)),
        }
    }
}

/// How soon a candidate can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "availability", rename_all = "snake_case")]
pub enum Availability {
    Immediate,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
    NotAvailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::TwoWeeks => "two_weeks",
            Self::OneMonth => "one_month",
            Self::ThreeMonths => "three_months",
            Self::NotAvailable => "not_available",
        }
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Self::Immediate),
            "two_weeks" => Ok(Self::TwoWeeks),
            "one_month" => Ok(Self::OneMonth),
            "three_months" => Ok(Self::ThreeMonths),
            "not_available" => Ok(Self::NotAvailable),
            other => Err(format!("unknown availability '{}'", other)),
        }
    }
}

/// Tag vocabulary category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "tag_category", rename_all = "snake_case")]
pub enum TagCategory {
    Skill,
    Industry,
    BoardType,
}

impl TagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Industry => "industry",
            Self::BoardType => "board_type",
        }
    }
}

/// Result ordering mode.
///
/// `Relevance` runs the weighted scoring pipeline; every other key sorts
/// directly on the named field. All keys share a final tie-break on `id`
/// ascending so pagination is stable across identical requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    Salary,
    Experience,
    Alphabetical,
    Updated,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "salary" => Ok(Self::Salary),
            "experience" => Ok(Self::Experience),
            "alphabetical" => Ok(Self::Alphabetical),
            "updated" => Ok(Self::Updated),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_level_parse_roundtrip() {
        for s in ["entry", "junior", "mid", "senior", "lead", "executive"] {
            let level: ExperienceLevel = s.parse().unwrap();
            assert_eq!(level.as_str(), s);
        }
    }

    #[test]
    fn experience_level_rejects_unknown() {
        assert!("principal".parse::<ExperienceLevel>().is_err());
        assert!("Senior".parse::<ExperienceLevel>().is_err()); // case-sensitive
    }

    #[test]
    fn experience_rank_is_ordered() {
        let senior: ExperienceLevel = "senior".parse().unwrap();
        let exec: ExperienceLevel = "executive".parse().unwrap();
        assert!(exec.rank() > senior.rank());
    }

    #[test]
    fn sort_key_defaults_to_relevance() {
        assert_eq!(SortKey::default(), SortKey::Relevance);
        assert!("best_match".parse::<SortKey>().is_err());
    }
}
