//! Core game state machine.
//!
//! `GameState` is the single authoritative record exchanged with the
//! external store. Every operation is all-or-nothing: it takes `&self`,
//! validates its preconditions, and returns a fresh snapshot, so a
//! rejected call can never leave a half-applied update behind.

use crate::actions::{LastAction, PendingBid};
use crate::bid::{validate_bid, Bid, BidError};
use crate::player::{Player, PlayerId};
use crate::round::{self, next_active_player};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest players a game can start with
pub const MIN_PLAYERS: usize = 2;

/// Most players a single table holds
pub const MAX_PLAYERS: usize = 8;

/// Lobby-to-endgame lifecycle of a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Players may join and toggle readiness
    Waiting,
    /// Rounds of bidding and resolution
    Playing,
    /// One player left with dice; record awaits deletion
    Finished,
}

/// Errors that can occur when applying operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("game is not waiting for players")]
    NotWaiting,

    #[error("game is not in progress")]
    NotPlaying,

    #[error("game is already decided")]
    AlreadyDecided,

    #[error("only the creator may do this")]
    NotCreator,

    #[error("at least {min} players required, got {got}")]
    NotEnoughPlayers { min: usize, got: usize },

    #[error("game is full ({max} players)")]
    GameFull { max: usize },

    #[error("not every player is ready")]
    PlayersNotReady,

    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("no pending bid to act on")]
    NoPendingBid,

    #[error("illegal bid: {0}")]
    IllegalBid(#[from] BidError),
}

/// The complete game state, as persisted by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Lifecycle phase
    pub status: GameStatus,
    /// Id of the creating player
    pub created_by: PlayerId,
    /// Turn rotation order is this insertion order, filtered to players
    /// still holding dice
    pub players: Vec<Player>,
    /// Whose turn it is; `None` unless playing
    pub current_player: Option<PlayerId>,
    /// Round counter, bumped by every challenge or Calza resolution
    pub round: u32,
    /// Most recent action, `None` before the game starts
    pub last_action: Option<LastAction>,
}

impl GameState {
    /// Create the waiting-room record the lobby layer persists when the
    /// first player arrives.
    pub fn new(mut creator: Player) -> Self {
        creator.is_creator = true;
        Self {
            status: GameStatus::Waiting,
            created_by: creator.id.clone(),
            players: vec![creator],
            current_player: None,
            round: 0,
            last_action: None,
        }
    }

    /// Add a joining player while the game is still waiting.
    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::NotWaiting);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::GameFull { max: MAX_PLAYERS });
        }
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(GameError::DuplicatePlayer(player.id));
        }
        self.players.push(player);
        Ok(())
    }

    /// Toggle a player's lobby readiness flag.
    pub fn set_ready(&mut self, player_id: &str, ready: bool) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::NotWaiting);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        player.is_ready = ready;
        Ok(())
    }

    pub fn find_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Players still holding dice, in rotation order.
    pub fn active_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_active()).collect()
    }

    /// Total dice on the table.
    pub fn total_dice(&self) -> u32 {
        self.players.iter().map(|p| p.dice_count as u32).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// The last player standing, once the game is decided.
    pub fn winner(&self) -> Option<&Player> {
        round::winner(&self.players)
    }

    pub fn is_player_turn(&self, player_id: &str) -> bool {
        self.status == GameStatus::Playing && self.current_player.as_deref() == Some(player_id)
    }

    /// Whether Palifico rules constrain this player's bids.
    pub fn is_palifico(&self, player_id: &str) -> bool {
        self.find_player(player_id).is_some_and(|p| p.is_palifico())
    }

    /// The bid awaiting a raise, challenge, or Calza, if any.
    pub fn pending_bid(&self) -> Option<PendingBid> {
        match &self.last_action {
            Some(LastAction::Bid {
                player,
                value,
                count,
                is_palifico,
            }) => Some(PendingBid {
                player: player.clone(),
                value: *value,
                count: *count,
                is_palifico: *is_palifico,
            }),
            _ => None,
        }
    }

    /// Start the game: creator-only, at least [`MIN_PLAYERS`] players,
    /// everyone ready. Deals five dice to each player and hands the
    /// first turn to a uniformly random one.
    pub fn start_game<R: Rng>(&self, creator_id: &str, rng: &mut R) -> Result<Self, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::NotWaiting);
        }
        if creator_id != self.created_by {
            return Err(GameError::NotCreator);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                min: MIN_PLAYERS,
                got: self.players.len(),
            });
        }
        if !self.players.iter().all(|p| p.is_ready) {
            return Err(GameError::PlayersNotReady);
        }

        let mut next = self.clone();
        for player in next.players.iter_mut() {
            player.deal(rng);
        }
        let first = rng.gen_range(0..next.players.len());
        next.status = GameStatus::Playing;
        next.current_player = Some(next.players[first].id.clone());
        next.round = 1;
        next.last_action = Some(LastAction::GameStart {
            player: creator_id.to_string(),
        });
        Ok(next)
    }

    /// Place a bid, raising over the pending one if there is one.
    ///
    /// The Palifico constraint applies only when the bidder themselves
    /// is down to one die; other players bid under the normal rules
    /// even while a Palifico player is at the table.
    pub fn place_bid(&self, player_id: &str, bid: Bid) -> Result<Self, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let bidder = self
            .find_player(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if !self.is_player_turn(player_id) {
            return Err(GameError::NotYourTurn);
        }
        if self.active_players().len() < MIN_PLAYERS {
            return Err(GameError::AlreadyDecided);
        }

        let is_palifico = bidder.is_palifico();
        let last = self.pending_bid().map(|p| Bid::new(p.value, p.count));
        validate_bid(&bid, last.as_ref(), is_palifico)?;

        let next_player = next_active_player(&self.players, player_id)
            .ok_or(GameError::AlreadyDecided)?
            .id
            .clone();

        let mut next = self.clone();
        next.current_player = Some(next_player);
        next.last_action = Some(LastAction::Bid {
            player: player_id.to_string(),
            value: bid.dice_value,
            count: bid.dice_count,
            is_palifico,
        });
        Ok(next)
    }

    /// Call Dudo on the pending bid and resolve the round.
    pub fn challenge_bid<R: Rng>(&self, player_id: &str, rng: &mut R) -> Result<Self, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.find_player(player_id).is_none() {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }
        if !self.is_player_turn(player_id) {
            return Err(GameError::NotYourTurn);
        }
        let bid = self.pending_bid().ok_or(GameError::NoPendingBid)?;

        let (players, outcome) = round::resolve_challenge(&self.players, &bid, player_id, rng);

        let mut next = self.clone();
        next.players = players;
        next.status = if outcome.is_game_over {
            GameStatus::Finished
        } else {
            GameStatus::Playing
        };
        next.current_player = outcome.next_player.clone();
        next.round = self.round + 1;
        next.last_action = Some(LastAction::Challenge {
            player: outcome.challenger,
            challenged_player: outcome.challenged,
            actual_count: outcome.actual_count,
            target_count: outcome.target_count,
            losing_player_id: outcome.losing_player_id,
        });
        Ok(next)
    }

    /// Declare the pending bid exactly correct and resolve the round.
    pub fn declare_calza<R: Rng>(&self, player_id: &str, rng: &mut R) -> Result<Self, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.find_player(player_id).is_none() {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }
        if !self.is_player_turn(player_id) {
            return Err(GameError::NotYourTurn);
        }
        let bid = self.pending_bid().ok_or(GameError::NoPendingBid)?;

        let (players, outcome) = round::resolve_calza(&self.players, &bid, player_id, rng);

        let mut next = self.clone();
        next.players = players;
        next.status = if outcome.is_game_over {
            GameStatus::Finished
        } else {
            GameStatus::Playing
        };
        next.current_player = outcome.next_player.clone();
        next.round = self.round + 1;
        next.last_action = Some(LastAction::Calza {
            player: outcome.player,
            actual_count: outcome.actual_count,
            target_count: outcome.target_count,
            is_calza_correct: outcome.is_calza_correct,
        });
        Ok(next)
    }

    /// Check that `player_id` may discard this record. Deleting it is
    /// the store's job; a fresh record starts the next game.
    pub fn authorize_reset(&self, player_id: &str) -> Result<(), GameError> {
        if player_id != self.created_by {
            return Err(GameError::NotCreator);
        }
        Ok(())
    }
}
