use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the direction of a vote cast by a user.
///
/// A stored vote is always one of the two directions. The absence of a vote
/// is represented by the absence of a ledger entry, never by a zero value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "i16", try_from = "i16")]
pub enum VoteValue {
    /// Indicates an upvote, contributing +1 to the post score.
    Up,
    /// Indicates a downvote, contributing -1 to the post score.
    Down,
}

impl VoteValue {
    /// Returns the signed unit stored in the ledger for this direction.
    pub fn as_i16(self) -> i16 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }

    /// Returns the contribution of this direction to a post score.
    pub fn score(self) -> i64 {
        i64::from(self.as_i16())
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        value.as_i16()
    }
}

/// Error returned when a stored or requested value is not a valid vote direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidVoteValue(pub i16);

impl fmt::Display for InvalidVoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid vote value {}, expected -1 or 1", self.0)
    }
}

impl std::error::Error for InvalidVoteValue {}

impl TryFrom<i16> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteValue::Up => write!(f, "up"),
            VoteValue::Down => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_vote() {
        assert_eq!(VoteValue::try_from(0), Err(InvalidVoteValue(0)));
        assert_eq!(VoteValue::try_from(2), Err(InvalidVoteValue(2)));
    }

    #[test]
    fn test_directions_cancel_out() {
        assert_eq!(VoteValue::Up.score(), 1);
        assert_eq!(VoteValue::Down.score(), -1);
        assert_eq!(VoteValue::Up.score() + VoteValue::Down.score(), 0);
    }

    #[test]
    fn test_serializes_as_signed_unit() {
        assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "-1");
        let parsed: VoteValue = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, VoteValue::Up);
        assert!(serde_json::from_str::<VoteValue>("0").is_err());
    }
}
