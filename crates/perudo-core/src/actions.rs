//! The last-action record persisted with the game state, plus the
//! round-outcome metadata surfaced to callers.

use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// The most recent state-changing action, persisted as part of the game
/// record. The `type` tag and field names are the store wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LastAction {
    /// The creator started the game.
    #[serde(rename_all = "camelCase")]
    GameStart { player: PlayerId },

    /// A bid is pending; the next player must raise, challenge, or Calza.
    #[serde(rename_all = "camelCase")]
    Bid {
        player: PlayerId,
        value: u8,
        count: u32,
        /// Whether the bidder was under Palifico rules, which also
        /// disables wild counting when this bid is resolved
        is_palifico: bool,
    },

    /// A Dudo resolved the pending bid.
    #[serde(rename_all = "camelCase")]
    Challenge {
        player: PlayerId,
        challenged_player: PlayerId,
        actual_count: u32,
        target_count: u32,
        losing_player_id: PlayerId,
    },

    /// A Calza declaration resolved the pending bid.
    #[serde(rename_all = "camelCase")]
    Calza {
        player: PlayerId,
        actual_count: u32,
        target_count: u32,
        is_calza_correct: bool,
    },
}

/// The bid a challenge or Calza resolves against, extracted from
/// [`LastAction::Bid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBid {
    pub player: PlayerId,
    pub value: u8,
    pub count: u32,
    pub is_palifico: bool,
}

/// Everything a caller needs to report a challenge result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOutcome {
    pub challenger: PlayerId,
    pub challenged: PlayerId,
    pub actual_count: u32,
    pub target_count: u32,
    pub losing_player_id: PlayerId,
    pub is_game_over: bool,
    /// Set iff the game ended
    pub winner: Option<PlayerId>,
    /// Turn holder for the next round; `None` iff the game ended
    pub next_player: Option<PlayerId>,
}

/// Everything a caller needs to report a Calza result. Only the
/// declarer is ever rewarded or penalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalzaOutcome {
    pub player: PlayerId,
    pub actual_count: u32,
    pub target_count: u32,
    pub is_calza_correct: bool,
    pub is_game_over: bool,
    /// Set iff the game ended
    pub winner: Option<PlayerId>,
    /// Turn holder for the next round; `None` iff the game ended
    pub next_player: Option<PlayerId>,
}
