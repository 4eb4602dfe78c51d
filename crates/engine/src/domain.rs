//! Fund domains.
//!
//! Every ledger record belongs to exactly one [`Domain`], and each domain is
//! balanced independently. A domain's account exists implicitly with a zero
//! balance until its first record is appended.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Medicine inventory fund.
    Medicine,
    /// Operation theatre fund.
    Operation,
    /// House-security ledger.
    HouseSecurity,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Self::Medicine, Self::Operation, Self::HouseSecurity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medicine => "medicine",
            Self::Operation => "operation",
            Self::HouseSecurity => "house_security",
        }
    }

    /// Short code used as transaction number prefix.
    pub fn code(self) -> &'static str {
        match self {
            Self::Medicine => "MED",
            Self::Operation => "OPR",
            Self::HouseSecurity => "HSL",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Medicine => 0,
            Self::Operation => 1,
            Self::HouseSecurity => 2,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Domain {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "medicine" => Ok(Self::Medicine),
            "operation" => Ok(Self::Operation),
            "house_security" | "house-security" => Ok(Self::HouseSecurity),
            other => Err(EngineError::NotFound(format!("domain {other}"))),
        }
    }
}

impl FromStr for Domain {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_storage_name() {
        for domain in Domain::ALL {
            assert_eq!(Domain::try_from(domain.as_str()), Ok(domain));
        }
    }

    #[test]
    fn unknown_domain_is_not_found() {
        assert_eq!(
            "pharmacy".parse::<Domain>(),
            Err(EngineError::NotFound("domain pharmacy".to_string()))
        );
    }

    #[test]
    fn lock_indexes_are_distinct() {
        let mut seen: Vec<usize> = Domain::ALL.iter().map(|d| d.index()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
