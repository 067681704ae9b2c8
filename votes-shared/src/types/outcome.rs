use serde::{Deserialize, Serialize};
use crate::types::VoteValue;

/// Describes what a vote or unvote operation did to the ledger.
///
/// Each variant carries the delta that was applied to the post score in the
/// same transaction as the ledger write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// A new ledger entry was inserted.
    Created { value: VoteValue, delta: i64 },
    /// The existing entry already had the requested value.
    Unchanged { value: VoteValue },
    /// The existing entry changed direction.
    Flipped { from: VoteValue, to: VoteValue, delta: i64 },
    /// The existing entry was deleted.
    Removed { value: VoteValue, delta: i64 },
}

impl VoteOutcome {
    /// Score delta applied by the operation.
    pub fn delta(&self) -> i64 {
        match self {
            VoteOutcome::Created { delta, .. }
            | VoteOutcome::Flipped { delta, .. }
            | VoteOutcome::Removed { delta, .. } => *delta,
            VoteOutcome::Unchanged { .. } => 0,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, VoteOutcome::Created { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_has_no_delta() {
        let outcome = VoteOutcome::Unchanged { value: VoteValue::Up };
        assert_eq!(outcome.delta(), 0);
        assert!(!outcome.is_created());
    }

    #[test]
    fn test_outcome_is_tagged_in_json() {
        let outcome = VoteOutcome::Flipped { from: VoteValue::Down, to: VoteValue::Up, delta: 2 };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["outcome"], "flipped");
        assert_eq!(json["from"], -1);
        assert_eq!(json["delta"], 2);
    }
}
