pub mod counting;
pub mod hand;
pub mod shoe;
pub mod single;
pub mod split;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;
use thiserror::Error;

pub use counting::{weight, HalvesCount};
pub use hand::{cmp_scores, Hand};
pub use shoe::Shoe;
pub use single::{BlackjackEnv, Observation};
pub use split::{BlackjackSplitEnv, SplitObservation};

/// Table rules shared by both environment variants.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Number of 52-card decks in a fresh shoe. Must be at least 1.
    pub num_decks: u8,
    /// The shoe is rebuilt before the next draw once fewer cards remain.
    pub reshuffle_threshold: usize,
    /// Pay 1.5 instead of 1.0 on a winning natural blackjack.
    pub natural: bool,
}

impl Rule {
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.num_decks == 0 {
            return Err(EnvError::InvalidRule("num_decks must be at least 1"));
        }
        if self.reshuffle_threshold == 0 {
            return Err(EnvError::InvalidRule(
                "reshuffle_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            num_decks: 6,
            reshuffle_threshold: 15,
            natural: false,
        }
    }
}

/// An action code accepted by `step`. The discriminants are the wire codes:
/// 0 = stand, 1 = hit, 2 = double, 3 = split (split variant only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Action {
    Stand = 0,
    Hit = 1,
    Double = 2,
    Split = 3,
}

impl TryFrom<u8> for Action {
    type Error = EnvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Stand),
            1 => Ok(Action::Hit),
            2 => Ok(Action::Double),
            3 => Ok(Action::Split),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

/// Which of the two environment variants a driver should run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum Variant {
    Single,
    Split,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("invalid rule: {0}")]
    InvalidRule(&'static str),
    #[error("action code {0} is outside the legal action set")]
    InvalidAction(u8),
    #[error("the round is over; call reset to start a new one")]
    RoundOver,
    #[error("split is not available in this state")]
    SplitUnavailable,
}

/// What `step` hands back to the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_codes_round_trip() {
        assert_eq!(Action::try_from(0), Ok(Action::Stand));
        assert_eq!(Action::try_from(1), Ok(Action::Hit));
        assert_eq!(Action::try_from(2), Ok(Action::Double));
        assert_eq!(Action::try_from(3), Ok(Action::Split));
        assert_eq!(Action::Double as u8, 2);
    }

    #[test]
    fn out_of_range_action_code_is_rejected() {
        assert_eq!(Action::try_from(4), Err(EnvError::InvalidAction(4)));
        assert_eq!(Action::try_from(255), Err(EnvError::InvalidAction(255)));
    }

    #[test]
    fn default_rule_is_valid() {
        let rule = Rule::default();
        assert!(rule.validate().is_ok());
        assert_eq!(rule.num_decks, 6);
        assert_eq!(rule.reshuffle_threshold, 15);
        assert!(!rule.natural);
    }

    #[test]
    fn zero_decks_is_rejected() {
        let rule = Rule {
            num_decks: 0,
            ..Rule::default()
        };
        assert!(rule.validate().is_err());
    }

    #[test]
    fn variant_parses_from_config_strings() {
        let variant: Variant = "Split".parse().unwrap();
        assert_eq!(variant, Variant::Split);
        assert!("NotAVariant".parse::<Variant>().is_err());
    }
}
