use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RelnormError;

/// Normal forms in the order the planner climbs them.
///
/// The derived `Ord` is the progression order, so `NormalForm::Third <
/// NormalForm::BoyceCodd` holds and can be used for monotonicity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalForm {
    #[serde(rename = "UNNORMALIZED")]
    Unnormalized,
    #[serde(rename = "1NF")]
    First,
    #[serde(rename = "2NF")]
    Second,
    #[serde(rename = "3NF")]
    Third,
    #[serde(rename = "BCNF")]
    BoyceCodd,
    #[serde(rename = "4NF")]
    Fourth,
    #[serde(rename = "5NF")]
    Fifth,
}

impl NormalForm {
    /// All normalized levels, lowest first.
    pub const LEVELS: [NormalForm; 6] = [
        NormalForm::First,
        NormalForm::Second,
        NormalForm::Third,
        NormalForm::BoyceCodd,
        NormalForm::Fourth,
        NormalForm::Fifth,
    ];

    /// Short label used in the result contract.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unnormalized => "UNNORMALIZED",
            Self::First => "1NF",
            Self::Second => "2NF",
            Self::Third => "3NF",
            Self::BoyceCodd => "BCNF",
            Self::Fourth => "4NF",
            Self::Fifth => "5NF",
        }
    }

    /// Human readable name.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Unnormalized => "Unnormalized",
            Self::First => "First Normal Form",
            Self::Second => "Second Normal Form",
            Self::Third => "Third Normal Form",
            Self::BoyceCodd => "Boyce-Codd Normal Form",
            Self::Fourth => "Fourth Normal Form",
            Self::Fifth => "Fifth Normal Form",
        }
    }

    /// What a table must satisfy to be at this level.
    pub fn requirement(&self) -> &'static str {
        match self {
            Self::Unnormalized => "no requirement",
            Self::First => "every column holds one atomic value and there are no repeating column groups",
            Self::Second => "every non-key attribute depends on the whole of every candidate key",
            Self::Third => "no non-key attribute depends on another non-key attribute",
            Self::BoyceCodd => "every determinant of a non-trivial dependency is a superkey",
            Self::Fourth => "every non-trivial multivalued dependency has a superkey on its left side",
            Self::Fifth => "every join dependency is implied by the candidate keys",
        }
    }

    /// Splits at this level may produce pieces that violate it again, so
    /// they count towards the recursion guard. Lower levels and 5NF always
    /// shrink the violating table.
    pub fn splits_nest(&self) -> bool {
        matches!(self, Self::BoyceCodd | Self::Fourth)
    }

    /// The level directly below this one.
    pub fn previous(&self) -> NormalForm {
        match self {
            Self::Unnormalized | Self::First => Self::Unnormalized,
            Self::Second => Self::First,
            Self::Third => Self::Second,
            Self::BoyceCodd => Self::Third,
            Self::Fourth => Self::BoyceCodd,
            Self::Fifth => Self::Fourth,
        }
    }

    /// Levels from 1NF up to and including `self`.
    pub fn levels_up_to(self) -> impl Iterator<Item = NormalForm> {
        Self::LEVELS.into_iter().take_while(move |level| *level <= self)
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NormalForm {
    type Err = RelnormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNNORMALIZED" | "0NF" | "UNF" => Ok(Self::Unnormalized),
            "1NF" | "FIRST" => Ok(Self::First),
            "2NF" | "SECOND" => Ok(Self::Second),
            "3NF" | "THIRD" => Ok(Self::Third),
            "BCNF" | "3.5NF" => Ok(Self::BoyceCodd),
            "4NF" | "FOURTH" => Ok(Self::Fourth),
            "5NF" | "FIFTH" | "PJNF" => Ok(Self::Fifth),
            other => Err(RelnormError::Configuration(format!(
                "unknown normal form '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_progression() {
        assert!(NormalForm::Unnormalized < NormalForm::First);
        assert!(NormalForm::Third < NormalForm::BoyceCodd);
        assert!(NormalForm::BoyceCodd < NormalForm::Fourth);
        assert_eq!(NormalForm::Fifth.previous(), NormalForm::Fourth);
        assert_eq!(NormalForm::First.previous(), NormalForm::Unnormalized);
    }

    #[test]
    fn test_levels_up_to() {
        let levels: Vec<_> = NormalForm::Third.levels_up_to().collect();
        assert_eq!(
            levels,
            vec![NormalForm::First, NormalForm::Second, NormalForm::Third]
        );
        assert_eq!(NormalForm::Unnormalized.levels_up_to().count(), 0);
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&NormalForm::BoyceCodd).unwrap(),
            "\"BCNF\""
        );
        let nf: NormalForm = serde_json::from_str("\"3NF\"").unwrap();
        assert_eq!(nf, NormalForm::Third);
    }

    #[test]
    fn test_requirements_and_nesting() {
        assert!(NormalForm::Second.requirement().contains("whole"));
        assert!(NormalForm::BoyceCodd.requirement().contains("superkey"));
        assert!(NormalForm::BoyceCodd.splits_nest());
        assert!(NormalForm::Fourth.splits_nest());
        assert!(!NormalForm::First.splits_nest());
        assert!(!NormalForm::Third.splits_nest());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("bcnf".parse::<NormalForm>().unwrap(), NormalForm::BoyceCodd);
        assert_eq!(" 5nf ".parse::<NormalForm>().unwrap(), NormalForm::Fifth);
        assert!("6NF".parse::<NormalForm>().is_err());
    }
}
