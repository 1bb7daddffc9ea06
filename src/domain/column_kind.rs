use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a column in a board's workflow.
///
/// A board is laid out as one `Initial` column, any number of `Pending`
/// columns, one `Final` column and one `Cancel` column, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Initial,
    Pending,
    Final,
    Cancel,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Initial => "initial",
            ColumnKind::Pending => "pending",
            ColumnKind::Final => "final",
            ColumnKind::Cancel => "cancel",
        }
    }

    pub fn all() -> &'static [ColumnKind] {
        &[
            ColumnKind::Initial,
            ColumnKind::Pending,
            ColumnKind::Final,
            ColumnKind::Cancel,
        ]
    }

    /// Cards in a terminal column never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ColumnKind::Final | ColumnKind::Cancel)
    }

    pub fn can_block(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(ColumnKind::Initial),
            "pending" => Ok(ColumnKind::Pending),
            "final" => Ok(ColumnKind::Final),
            "cancel" => Ok(ColumnKind::Cancel),
            _ => Err(format!("Invalid column kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_from_its_name() {
        for kind in ColumnKind::all() {
            assert_eq!(kind.as_str().parse::<ColumnKind>(), Ok(*kind));
        }
        assert!("done".parse::<ColumnKind>().is_err());
    }

    #[test]
    fn only_final_and_cancel_are_terminal() {
        assert!(!ColumnKind::Initial.is_terminal());
        assert!(!ColumnKind::Pending.is_terminal());
        assert!(ColumnKind::Final.is_terminal());
        assert!(ColumnKind::Cancel.is_terminal());
        assert!(ColumnKind::Pending.can_block());
        assert!(!ColumnKind::Cancel.can_block());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ColumnKind::Final).unwrap();
        assert_eq!(json, "\"final\"");
    }
}
