//! Round resolution: dice counting, Dudo and Calza outcomes, rotation.
//!
//! The resolvers are pure apart from the injected random source used to
//! re-roll dice for the next round. They never touch the caller's
//! slice; the updated players are returned alongside the outcome.

use crate::actions::{CalzaOutcome, ChallengeOutcome, PendingBid};
use crate::player::{Player, PlayerId};
use rand::Rng;

/// Count dice matching `target_value` across all players. Outside
/// Palifico, 1s are wild and match any non-1 target.
pub fn count_matching_dice(players: &[Player], target_value: u8, is_palifico: bool) -> u32 {
    players
        .iter()
        .flat_map(|p| p.dice.iter())
        .filter(|&&die| {
            if is_palifico {
                die == target_value
            } else {
                die == target_value || (die == 1 && target_value != 1)
            }
        })
        .count() as u32
}

/// Whether fewer than two players still hold dice.
pub fn is_game_over(players: &[Player]) -> bool {
    players.iter().filter(|p| p.is_active()).count() <= 1
}

/// The last player standing, once everyone else is out of dice.
pub fn winner(players: &[Player]) -> Option<&Player> {
    let mut active = players.iter().filter(|p| p.is_active());
    match (active.next(), active.next()) {
        (Some(p), None) => Some(p),
        _ => None,
    }
}

/// Next player holding dice after `after_id`, in insertion order with
/// wrap-around. `None` when fewer than two players remain active.
pub fn next_active_player<'a>(players: &'a [Player], after_id: &str) -> Option<&'a Player> {
    if is_game_over(players) {
        return None;
    }
    let start = players.iter().position(|p| p.id == after_id)?;
    (1..=players.len())
        .map(|offset| &players[(start + offset) % players.len()])
        .find(|p| p.is_active())
}

/// Who takes the next turn after `pivot_id` resolved a round: the pivot
/// themselves while they still hold dice, otherwise the next active
/// player after their seat.
fn next_turn_holder(players: &[Player], pivot_id: &str) -> Option<PlayerId> {
    let pivot_active = players.iter().any(|p| p.id == pivot_id && p.is_active());
    if pivot_active {
        Some(pivot_id.to_string())
    } else {
        next_active_player(players, pivot_id).map(|p| p.id.clone())
    }
}

/// Resolve a Dudo against the pending bid.
///
/// The challenger loses a die when the bid holds (`actual >= target`),
/// otherwise the bidder does. Everyone still holding dice gets a fresh
/// hand for the next round.
pub fn resolve_challenge<R: Rng>(
    players: &[Player],
    bid: &PendingBid,
    challenger_id: &str,
    rng: &mut R,
) -> (Vec<Player>, ChallengeOutcome) {
    let actual_count = count_matching_dice(players, bid.value, bid.is_palifico);
    let losing_player_id: PlayerId = if actual_count >= bid.count {
        challenger_id.to_string()
    } else {
        bid.player.clone()
    };

    let mut players = players.to_vec();
    for player in players.iter_mut() {
        if player.id == losing_player_id {
            player.lose_die();
        }
    }
    for player in players.iter_mut() {
        if player.is_active() {
            player.reroll(rng);
        }
    }

    let game_over = is_game_over(&players);
    let next_player = if game_over {
        None
    } else {
        next_turn_holder(&players, &losing_player_id)
    };

    let outcome = ChallengeOutcome {
        challenger: challenger_id.to_string(),
        challenged: bid.player.clone(),
        actual_count,
        target_count: bid.count,
        losing_player_id,
        is_game_over: game_over,
        winner: winner(&players).map(|p| p.id.clone()),
        next_player,
    };
    (players, outcome)
}

/// Resolve a Calza declaration against the pending bid.
///
/// An exact match (`actual == target`) hands the declarer a die back,
/// capped at the starting count; anything else costs them one. No other
/// player is ever touched beyond the universal re-roll.
pub fn resolve_calza<R: Rng>(
    players: &[Player],
    bid: &PendingBid,
    declarer_id: &str,
    rng: &mut R,
) -> (Vec<Player>, CalzaOutcome) {
    let actual_count = count_matching_dice(players, bid.value, bid.is_palifico);
    let is_calza_correct = actual_count == bid.count;

    let mut players = players.to_vec();
    for player in players.iter_mut() {
        if player.id == declarer_id {
            if is_calza_correct {
                player.gain_die();
            } else {
                player.lose_die();
            }
        }
    }
    for player in players.iter_mut() {
        if player.is_active() {
            player.reroll(rng);
        }
    }

    let game_over = is_game_over(&players);
    let next_player = if game_over {
        None
    } else {
        next_turn_holder(&players, declarer_id)
    };

    let outcome = CalzaOutcome {
        player: declarer_id.to_string(),
        actual_count,
        target_count: bid.count,
        is_calza_correct,
        is_game_over: game_over,
        winner: winner(&players).map(|p| p.id.clone()),
        next_player,
    };
    (players, outcome)
}
