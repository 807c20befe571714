//! Player state and dice management.
//!
//! A player's dice are hidden from opponents in a real deployment; the
//! engine keeps full visibility so it can resolve rounds.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque external player identifier (device id, session id, ...).
pub type PlayerId = String;

/// Dice dealt to every player at game start; also the Calza recovery cap.
pub const STARTING_DICE: u8 = 5;

/// Maximum display-name length, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Errors from display-name validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,

    #[error("name must be at most {MAX_NAME_LEN} characters, got {0}")]
    TooLong(usize),

    #[error("name contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// Roll a single die, uniform in `[1, 6]`.
pub fn roll_die<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(1..=6)
}

/// Roll `count` fresh dice, each independent of every previous roll.
pub fn roll_dice<R: Rng>(rng: &mut R, count: u8) -> Vec<u8> {
    (0..count).map(|_| roll_die(rng)).collect()
}

/// Validate a display name: 1-20 characters, letters (accented Latin
/// included), digits, space, hyphen, underscore.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(NameError::Empty);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong(len));
    }
    for c in name.chars() {
        if !(c.is_alphanumeric() || c == ' ' || c == '-' || c == '_') {
            return Err(NameError::ForbiddenChar(c));
        }
    }
    Ok(())
}

/// A single player's state.
///
/// Insertion order in [`crate::GameState::players`] defines the turn
/// rotation; a player stays listed after dropping to zero dice so the
/// end-of-game display still has them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier for the duration of a game
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Dice currently held, in `[0, STARTING_DICE]`
    pub dice_count: u8,
    /// Current hand, always exactly `dice_count` long
    pub dice: Vec<u8>,
    /// Lobby readiness flag, irrelevant once the game starts
    pub is_ready: bool,
    /// Exactly one player per game: may start, cancel, and reset it
    pub is_creator: bool,
}

impl Player {
    /// Create a player with no dice (the lobby shape before a game starts).
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id: id.into(),
            name,
            dice_count: 0,
            dice: Vec::new(),
            is_ready: false,
            is_creator: false,
        })
    }

    /// Player still holds dice and takes turns.
    pub fn is_active(&self) -> bool {
        self.dice_count > 0
    }

    /// Down to a single die: Palifico rules constrain this player's bids.
    pub fn is_palifico(&self) -> bool {
        self.dice_count == 1
    }

    /// Deal a fresh starting hand.
    pub fn deal<R: Rng>(&mut self, rng: &mut R) {
        self.dice_count = STARTING_DICE;
        self.dice = roll_dice(rng, STARTING_DICE);
    }

    /// Re-roll the hand at the current count. No die value survives a round.
    pub fn reroll<R: Rng>(&mut self, rng: &mut R) {
        self.dice = roll_dice(rng, self.dice_count);
    }

    /// Remove one die, its value discarded. Never goes below zero.
    pub fn lose_die(&mut self) {
        self.dice_count = self.dice_count.saturating_sub(1);
        self.dice.truncate(self.dice_count as usize);
    }

    /// Recover one die, capped at the starting count. The hand must be
    /// re-rolled afterwards to match the new count.
    pub fn gain_die(&mut self) {
        self.dice_count = (self.dice_count + 1).min(STARTING_DICE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("José-María_2").is_ok());
        assert!(validate_name("a b").is_ok());

        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_name("abcdefghijklmnopqrstu"),
            Err(NameError::TooLong(21))
        );
        assert_eq!(validate_name("nope!"), Err(NameError::ForbiddenChar('!')));
    }

    #[test]
    fn test_new_player_rejects_bad_name() {
        assert!(Player::new("p1", "fine name").is_ok());
        assert!(Player::new("p1", "<script>").is_err());
    }

    #[test]
    fn test_deal_and_reroll() {
        let mut rng = rand::thread_rng();
        let mut player = Player::new("p1", "Alice").unwrap();

        player.deal(&mut rng);
        assert_eq!(player.dice_count, STARTING_DICE);
        assert_eq!(player.dice.len(), STARTING_DICE as usize);
        assert!(player.dice.iter().all(|d| (1..=6).contains(d)));

        player.dice_count = 3;
        player.reroll(&mut rng);
        assert_eq!(player.dice.len(), 3);
        assert!(player.dice.iter().all(|d| (1..=6).contains(d)));
    }

    #[test]
    fn test_lose_die_truncates_and_floors() {
        let mut player = Player::new("p1", "Alice").unwrap();
        player.dice_count = 2;
        player.dice = vec![4, 6];

        player.lose_die();
        assert_eq!(player.dice_count, 1);
        assert_eq!(player.dice, vec![4]);
        assert!(player.is_palifico());

        player.lose_die();
        assert_eq!(player.dice_count, 0);
        assert!(player.dice.is_empty());
        assert!(!player.is_active());

        // Already at zero
        player.lose_die();
        assert_eq!(player.dice_count, 0);
    }

    #[test]
    fn test_gain_die_caps_at_starting_count() {
        let mut player = Player::new("p1", "Alice").unwrap();
        player.dice_count = 4;
        player.gain_die();
        assert_eq!(player.dice_count, 5);

        player.gain_die();
        assert_eq!(player.dice_count, 5);
    }
}
