//! Bids and the bid validator.
//!
//! A bid claims "at least `dice_count` dice across all players show
//! `dice_value`", 1s counting as wild outside Palifico. Validation is
//! pure and side-effect free, so the UI layer can call it speculatively
//! (e.g. to enumerate legal bids) against the same rules the state
//! machine enforces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest die face.
pub const MIN_DICE_VALUE: u8 = 1;
/// Highest die face.
pub const MAX_DICE_VALUE: u8 = 6;
/// Practical ceiling on announced counts (8 players of 5 dice leaves headroom).
pub const MAX_BID_COUNT: u32 = 50;

/// A claim of the form "at least `dice_count` dice show `dice_value`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub dice_value: u8,
    pub dice_count: u32,
}

impl Bid {
    pub fn new(dice_value: u8, dice_count: u32) -> Self {
        Self {
            dice_value,
            dice_count,
        }
    }

    /// Check the bid is well-formed, independent of any previous bid.
    pub fn validate_shape(&self) -> Result<(), BidError> {
        if !(MIN_DICE_VALUE..=MAX_DICE_VALUE).contains(&self.dice_value) {
            return Err(BidError::ValueOutOfRange(self.dice_value));
        }
        if self.dice_count < 1 || self.dice_count > MAX_BID_COUNT {
            return Err(BidError::CountOutOfRange(self.dice_count));
        }
        Ok(())
    }
}

/// Why a proposed bid was rejected. Every successor-rule variant names
/// the minimum count that would have been legal, for UI feedback.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BidError {
    #[error("dice value must be between {MIN_DICE_VALUE} and {MAX_DICE_VALUE}, got {0}")]
    ValueOutOfRange(u8),

    #[error("dice count must be between 1 and {MAX_BID_COUNT}, got {0}")]
    CountOutOfRange(u32),

    #[error("in Palifico you may only bid on {value}s")]
    PalificoValueFixed { value: u8 },

    #[error("in Palifico you must announce at least {min} dice")]
    PalificoCountTooLow { min: u32 },

    #[error("switching to wilds (1s) requires at least {min} dice")]
    WildEntryTooLow { min: u32 },

    #[error("leaving wilds (1s) requires at least {min} dice")]
    WildExitTooLow { min: u32 },

    #[error("keeping value {value} requires at least {min} dice")]
    SameValueTooLow { value: u8, min: u32 },

    #[error("raising to value {value} requires at least {min} dice")]
    HigherValueTooLow { value: u8, min: u32 },

    #[error("dropping to value {value} requires at least {min} dice")]
    LowerValueTooLow { value: u8, min: u32 },
}

impl BidError {
    /// The minimum legal count named by this rejection, when one applies.
    pub fn min_count(&self) -> Option<u32> {
        match *self {
            BidError::PalificoCountTooLow { min }
            | BidError::WildEntryTooLow { min }
            | BidError::WildExitTooLow { min }
            | BidError::SameValueTooLow { min, .. }
            | BidError::HigherValueTooLow { min, .. }
            | BidError::LowerValueTooLow { min, .. } => Some(min),
            _ => None,
        }
    }
}

/// Decide whether `proposed` is a legal successor to `last`.
///
/// With no previous bid, any well-formed bid opens the round. Under
/// Palifico the value is frozen and only the count may grow. Otherwise
/// the ordering rules apply in precedence order: entering wilds costs
/// half the prior count rounded up, leaving wilds costs more than
/// double, same value needs strictly more dice, a higher value carries
/// the raise at equal count, a lower value needs strictly more dice.
pub fn validate_bid(proposed: &Bid, last: Option<&Bid>, is_palifico: bool) -> Result<(), BidError> {
    proposed.validate_shape()?;

    let Some(last) = last else {
        return Ok(());
    };

    if is_palifico {
        if proposed.dice_value != last.dice_value {
            return Err(BidError::PalificoValueFixed {
                value: last.dice_value,
            });
        }
        if proposed.dice_count <= last.dice_count {
            return Err(BidError::PalificoCountTooLow {
                min: last.dice_count + 1,
            });
        }
        return Ok(());
    }

    // Entering wilds: half the prior count, rounded up.
    if last.dice_value != 1 && proposed.dice_value == 1 {
        let min = (last.dice_count + 1) / 2;
        if proposed.dice_count < min {
            return Err(BidError::WildEntryTooLow { min });
        }
        return Ok(());
    }

    // Leaving wilds: more than double.
    if last.dice_value == 1 && proposed.dice_value != 1 {
        let min = last.dice_count * 2 + 1;
        if proposed.dice_count < min {
            return Err(BidError::WildExitTooLow { min });
        }
        return Ok(());
    }

    if proposed.dice_value == last.dice_value {
        if proposed.dice_count <= last.dice_count {
            return Err(BidError::SameValueTooLow {
                value: proposed.dice_value,
                min: last.dice_count + 1,
            });
        }
    } else if proposed.dice_value > last.dice_value {
        if proposed.dice_count < last.dice_count {
            return Err(BidError::HigherValueTooLow {
                value: proposed.dice_value,
                min: last.dice_count,
            });
        }
    } else if proposed.dice_count <= last.dice_count {
        return Err(BidError::LowerValueTooLow {
            value: proposed.dice_value,
            min: last.dice_count + 1,
        });
    }

    Ok(())
}

/// Enumerate every legal successor bid, counts capped at `total_dice`.
///
/// A bid appears here iff [`validate_bid`] accepts it. Results are
/// ordered by `(dice_value, dice_count)` ascending.
pub fn valid_bid_options(last: Option<&Bid>, total_dice: u32, is_palifico: bool) -> Vec<Bid> {
    let mut bids = Vec::new();

    if let Some(last) = last {
        if is_palifico {
            for count in last.dice_count + 1..=total_dice {
                bids.push(Bid::new(last.dice_value, count));
            }
            return bids;
        }
    }

    for value in MIN_DICE_VALUE..=MAX_DICE_VALUE {
        for count in 1..=total_dice {
            let bid = Bid::new(value, count);
            if validate_bid(&bid, last, is_palifico).is_ok() {
                bids.push(bid);
            }
        }
    }

    bids
}

/// Conservative auto-bid for turn timeouts: the smallest legal bid by
/// `(dice_value, dice_count)`. `None` means no legal bid exists and the
/// caller should challenge instead.
pub fn suggest_auto_bid(last: Option<&Bid>, total_dice: u32, is_palifico: bool) -> Option<Bid> {
    // valid_bid_options already enumerates in ascending order.
    valid_bid_options(last, total_dice, is_palifico).into_iter().next()
}
