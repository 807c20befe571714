//! Perudo (Liar's Dice) rules engine.
//!
//! This crate provides the authoritative game logic for Perudo:
//! - Bid validation, including the wild-1 pricing rules and Palifico
//! - Round resolution for Dudo challenges and Calza declarations
//! - The waiting / playing / finished turn state machine
//!
//! # Architecture
//!
//! The engine performs no I/O. Every public operation is a pure
//! function from `(state, player, args)` to a new state or a typed
//! error, deterministic except for the injected random source used to
//! re-roll dice. Lobby, presence, and real-time sync are external
//! collaborators; they interact with the engine through [`GameState`]
//! and the [`store::GameStore`] boundary.
//!
//! # Modules
//!
//! - [`player`]: player state, names, dice handling
//! - [`bid`]: bid validator and legal-bid enumeration
//! - [`actions`]: last-action record and round outcome metadata
//! - [`round`]: dice counting and challenge/Calza resolution
//! - [`game`]: the game state machine
//! - [`store`]: persistence boundary trait with an in-memory impl

pub mod actions;
pub mod bid;
pub mod game;
pub mod player;
pub mod round;
pub mod store;

// Re-export commonly used types
pub use actions::{CalzaOutcome, ChallengeOutcome, LastAction, PendingBid};
pub use bid::{
    suggest_auto_bid, valid_bid_options, validate_bid, Bid, BidError, MAX_BID_COUNT,
    MAX_DICE_VALUE, MIN_DICE_VALUE,
};
pub use game::{GameError, GameState, GameStatus, MAX_PLAYERS, MIN_PLAYERS};
pub use player::{Player, PlayerId, STARTING_DICE};
pub use round::{count_matching_dice, next_active_player};
pub use store::{GameStore, MemoryStore, StoreError};
