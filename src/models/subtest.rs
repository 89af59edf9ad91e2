//! The six scored subsections of the exam.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtest {
    Comprehension,
    Calcul,
    Raisonnement,
    ConditionsMinimales,
    Expression,
    Logique,
}

/// All six subtests, in exam order.
pub const ALL_SUBTESTS: [Subtest; 6] = [
    Subtest::Comprehension,
    Subtest::Calcul,
    Subtest::Raisonnement,
    Subtest::ConditionsMinimales,
    Subtest::Expression,
    Subtest::Logique,
];

/// Subtests eligible for TD retake scheduling (the calculation-heavy ones).
pub const RETAKE_ELIGIBLE_SUBTESTS: [Subtest; 3] = [
    Subtest::Calcul,
    Subtest::ConditionsMinimales,
    Subtest::Logique,
];

impl Subtest {
    /// Canonical display label; every view reads from this one table.
    pub fn label(&self) -> &'static str {
        match self {
            Subtest::Comprehension => "Compréhension de textes",
            Subtest::Calcul => "Calcul",
            Subtest::Raisonnement => "Raisonnement & argumentation",
            Subtest::ConditionsMinimales => "Conditions minimales",
            Subtest::Expression => "Expression",
            Subtest::Logique => "Logique",
        }
    }

    /// Stable identifier used in the database and JSON backups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtest::Comprehension => "comprehension",
            Subtest::Calcul => "calcul",
            Subtest::Raisonnement => "raisonnement",
            Subtest::ConditionsMinimales => "conditions_minimales",
            Subtest::Expression => "expression",
            Subtest::Logique => "logique",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_SUBTESTS.into_iter().find(|sub| sub.as_str() == s)
    }

    pub fn is_retake_eligible(&self) -> bool {
        RETAKE_ELIGIBLE_SUBTESTS.contains(self)
    }
}

impl ToSql for Subtest {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Subtest {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Subtest::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown subtest '{text}'").into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_all_subtests() {
        for subtest in ALL_SUBTESTS {
            assert_eq!(Subtest::parse(subtest.as_str()), Some(subtest));
        }
        assert_eq!(Subtest::parse("algebre"), None);
    }

    #[test]
    fn test_retake_eligibility() {
        assert!(Subtest::Logique.is_retake_eligible());
        assert!(Subtest::Calcul.is_retake_eligible());
        assert!(Subtest::ConditionsMinimales.is_retake_eligible());
        assert!(!Subtest::Expression.is_retake_eligible());
        assert!(!Subtest::Comprehension.is_retake_eligible());
        assert!(!Subtest::Raisonnement.is_retake_eligible());
    }
}
