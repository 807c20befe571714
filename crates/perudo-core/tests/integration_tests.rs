//! Integration tests for the Perudo engine.
//!
//! These tests drive complete games through the public operations, the
//! way a presentation layer (or the turn-timeout scheduler) would.

use perudo_core::*;

/// Build a ready-to-start lobby of `n` players p1..pn, p1 the creator.
fn lobby(n: usize) -> GameState {
    let mut game = GameState::new(Player::new("p1", "Alice").unwrap());
    for i in 2..=n {
        game.add_player(Player::new(format!("p{i}"), format!("Player {i}")).unwrap())
            .unwrap();
    }
    for i in 1..=n {
        game.set_ready(&format!("p{i}"), true).unwrap();
    }
    game
}

fn started(n: usize) -> GameState {
    lobby(n).start_game("p1", &mut rand::thread_rng()).unwrap()
}

/// Overwrite a player's hand, keeping `dice_count` in sync.
fn set_hand(game: &mut GameState, player_id: &str, dice: &[u8]) {
    let player = game
        .players
        .iter_mut()
        .find(|p| p.id == player_id)
        .unwrap();
    player.dice = dice.to_vec();
    player.dice_count = dice.len() as u8;
}

/// One turn of the timeout driver: auto-bid when a legal bid exists,
/// challenge otherwise.
fn auto_act(game: &GameState, rng: &mut impl rand::Rng) -> GameState {
    let current = game.current_player.clone().unwrap();
    let last = game
        .pending_bid()
        .map(|p| Bid::new(p.value, p.count));
    let palifico = game.is_palifico(&current);

    match suggest_auto_bid(last.as_ref(), game.total_dice(), palifico) {
        Some(bid) => game.place_bid(&current, bid).unwrap(),
        None => game.challenge_bid(&current, rng).unwrap(),
    }
}

#[test]
fn test_full_game_runs_to_completion() {
    let mut rng = rand::thread_rng();
    let mut game = started(4);
    assert_eq!(game.total_dice(), 20);

    let mut iterations = 0;
    while game.status == GameStatus::Playing {
        let total_before = game.total_dice();
        let had_pending = game.pending_bid().is_some();

        game = auto_act(&game, &mut rng);

        // A resolution costs the table exactly one die; a bid costs none.
        if matches!(game.last_action, Some(LastAction::Challenge { .. })) {
            assert_eq!(game.total_dice(), total_before - 1);
            assert!(had_pending);
        } else {
            assert_eq!(game.total_dice(), total_before);
        }

        // Re-roll invariant holds after every operation
        for player in &game.players {
            assert_eq!(player.dice.len(), player.dice_count as usize);
            assert!(player.dice.iter().all(|d| (1..=6).contains(d)));
        }

        // Whoever holds the turn must hold dice
        if let Some(current) = &game.current_player {
            assert!(game.find_player(current).unwrap().is_active());
        }

        iterations += 1;
        assert!(iterations < 10_000, "game should terminate");
    }

    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.current_player.is_none());
    let winner = game.winner().unwrap();
    assert!(winner.is_active());
    assert_eq!(game.active_players().len(), 1);
}

#[test]
fn test_finished_game_accepts_no_further_play() {
    let mut rng = rand::thread_rng();
    let mut game = started(2);
    while game.status == GameStatus::Playing {
        game = auto_act(&game, &mut rng);
    }

    let survivor = game.winner().unwrap().id.clone();
    assert_eq!(
        game.place_bid(&survivor, Bid::new(2, 1)),
        Err(GameError::NotPlaying)
    );
    assert_eq!(
        game.challenge_bid(&survivor, &mut rng),
        Err(GameError::NotPlaying)
    );
    assert_eq!(
        game.declare_calza(&survivor, &mut rng),
        Err(GameError::NotPlaying)
    );
}

#[test]
fn test_challenge_with_wilds_punishes_challenger() {
    // Spec'd table: p1 [1,1,1,2,3], p2 [2,2,4,5,6], pending bid "four 2s".
    // Wilds make the actual count 6, so the challenger loses the die.
    let mut game = started(2);
    set_hand(&mut game, "p1", &[1, 1, 1, 2, 3]);
    set_hand(&mut game, "p2", &[2, 2, 4, 5, 6]);
    game.current_player = Some("p2".into());
    game.last_action = Some(LastAction::Bid {
        player: "p1".into(),
        value: 2,
        count: 4,
        is_palifico: false,
    });

    let next = game.challenge_bid("p2", &mut rand::thread_rng()).unwrap();

    match &next.last_action {
        Some(LastAction::Challenge {
            actual_count,
            target_count,
            losing_player_id,
            ..
        }) => {
            assert_eq!(*actual_count, 6);
            assert_eq!(*target_count, 4);
            assert_eq!(losing_player_id, "p2");
        }
        other => panic!("expected challenge action, got {other:?}"),
    }
    assert_eq!(next.find_player("p2").unwrap().dice_count, 4);
    assert_eq!(next.find_player("p1").unwrap().dice_count, 5);
    assert_eq!(next.current_player.as_deref(), Some("p2"));
    assert_eq!(next.round, game.round + 1);
}

#[test]
fn test_calza_exact_count_restores_a_die() {
    let mut game = started(2);
    set_hand(&mut game, "p1", &[2, 2, 3, 4, 5]);
    set_hand(&mut game, "p2", &[4, 5, 6, 6]);
    game.current_player = Some("p2".into());
    // Exactly two 2s on the table, no wilds in either hand
    game.last_action = Some(LastAction::Bid {
        player: "p1".into(),
        value: 2,
        count: 2,
        is_palifico: false,
    });

    let next = game.declare_calza("p2", &mut rand::thread_rng()).unwrap();

    match &next.last_action {
        Some(LastAction::Calza {
            is_calza_correct,
            actual_count,
            ..
        }) => {
            assert!(is_calza_correct);
            assert_eq!(*actual_count, 2);
        }
        other => panic!("expected calza action, got {other:?}"),
    }
    let declarer = next.find_player("p2").unwrap();
    assert_eq!(declarer.dice_count, 5);
    assert_eq!(declarer.dice.len(), 5);
    assert_eq!(next.current_player.as_deref(), Some("p2"));
}

#[test]
fn test_wrong_calza_costs_the_declarer() {
    let mut game = started(2);
    set_hand(&mut game, "p1", &[2, 2, 3, 4, 5]);
    set_hand(&mut game, "p2", &[4, 5, 6, 6, 3]);
    game.current_player = Some("p2".into());
    game.last_action = Some(LastAction::Bid {
        player: "p1".into(),
        value: 2,
        count: 4,
        is_palifico: false,
    });

    let next = game.declare_calza("p2", &mut rand::thread_rng()).unwrap();

    assert_eq!(next.find_player("p2").unwrap().dice_count, 4);
    assert_eq!(next.find_player("p1").unwrap().dice_count, 5);
    assert_eq!(next.total_dice(), game.total_dice() - 1);
}

#[test]
fn test_elimination_keeps_playing_until_one_remains() {
    // Scenario: three actives, one elimination leaves two and the game
    // continues; the next elimination finishes it.
    let mut game = started(3);
    set_hand(&mut game, "p1", &[2]);
    set_hand(&mut game, "p2", &[3, 3, 4, 5, 6]);
    set_hand(&mut game, "p3", &[4, 4, 5, 6, 6]);
    game.current_player = Some("p2".into());
    // p1 overclaims wildly; losing this challenge eliminates them
    game.last_action = Some(LastAction::Bid {
        player: "p1".into(),
        value: 2,
        count: 11,
        is_palifico: true,
    });

    let mut rng = rand::thread_rng();
    let game = game.challenge_bid("p2", &mut rng).unwrap();

    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.active_players().len(), 2);
    assert_eq!(game.find_player("p1").unwrap().dice_count, 0);
    assert!(game.find_player("p1").unwrap().dice.is_empty());
    // Eliminated bidder's seat passes to the next active player
    assert_eq!(game.current_player.as_deref(), Some("p2"));

    // p1 is skipped in rotation from here on
    let after_bid = game.place_bid("p2", Bid::new(3, 2)).unwrap();
    assert_eq!(after_bid.current_player.as_deref(), Some("p3"));

    // Now eliminate p2 the same way
    let mut game = after_bid;
    set_hand(&mut game, "p2", &[3]);
    set_hand(&mut game, "p3", &[4, 4, 5, 6, 6]);
    game.current_player = Some("p3".into());
    game.last_action = Some(LastAction::Bid {
        player: "p2".into(),
        value: 2,
        count: 6,
        is_palifico: true,
    });

    let game = game.challenge_bid("p3", &mut rng).unwrap();

    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.current_player.is_none());
    assert_eq!(game.winner().unwrap().id, "p3");
}

#[test]
fn test_rejected_operations_never_mutate() {
    let mut rng = rand::thread_rng();
    let game = started(3);
    let current = game.current_player.clone().unwrap();
    let bystander = game
        .players
        .iter()
        .find(|p| p.id != current)
        .unwrap()
        .id
        .clone();
    let before = game.clone();

    assert!(game.place_bid(&bystander, Bid::new(3, 2)).is_err());
    assert!(game.place_bid(&current, Bid::new(9, 2)).is_err());
    assert!(game.challenge_bid(&bystander, &mut rng).is_err());
    assert!(game.challenge_bid(&current, &mut rng).is_err()); // no pending bid
    assert!(game.declare_calza(&current, &mut rng).is_err());
    assert!(game.place_bid("ghost", Bid::new(3, 2)).is_err());

    assert_eq!(game, before);
}

#[test]
fn test_auto_bid_agrees_with_live_state() {
    let game = started(2);
    let p1 = game.current_player.clone().unwrap();
    let game = game.place_bid(&p1, Bid::new(4, 3)).unwrap();
    let p2 = game.current_player.clone().unwrap();

    let pending = game.pending_bid().unwrap();
    let last = Bid::new(pending.value, pending.count);
    let suggestion =
        suggest_auto_bid(Some(&last), game.total_dice(), game.is_palifico(&p2)).unwrap();

    // The suggestion the timeout driver computes must be accepted
    let next = game.place_bid(&p2, suggestion).unwrap();
    assert_eq!(next.current_player.as_deref(), Some(p1.as_str()));
}

#[test]
fn test_store_round_trip_drives_a_game() {
    use std::sync::{Arc, Mutex};

    let mut rng = rand::thread_rng();
    let mut store = MemoryStore::new();

    let notifications = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&notifications);
    store.subscribe(Box::new(move |_| {
        *sink.lock().unwrap() += 1;
    }));

    // Lobby layer persists the waiting record
    store.save(&lobby(2)).unwrap();

    // Caller reads the latest snapshot, applies an operation, writes back
    let game = store.load().unwrap().unwrap();
    let game = game.start_game("p1", &mut rng).unwrap();
    store.save(&game).unwrap();

    let game = store.load().unwrap().unwrap();
    let current = game.current_player.clone().unwrap();
    let game = game.place_bid(&current, Bid::new(3, 2)).unwrap();
    store.save(&game).unwrap();

    let game = store.load().unwrap().unwrap();
    let challenger = game.current_player.clone().unwrap();
    let game = game.challenge_bid(&challenger, &mut rng).unwrap();
    store.save(&game).unwrap();

    assert_eq!(store.load().unwrap().unwrap().total_dice(), 9);

    // Reset: creator authorizes, store discards the record
    game.authorize_reset("p1").unwrap();
    store.delete().unwrap();
    assert!(store.load().unwrap().is_none());

    assert_eq!(*notifications.lock().unwrap(), 5);
}

#[test]
fn test_serialized_state_survives_the_store_wire() {
    // Persisting through JSON (the store's wire format) must not change
    // behavior: a deserialized snapshot accepts the same operations.
    let game = started(3);

    let json = serde_json::to_string(&game).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, game);

    let current = restored.current_player.clone().unwrap();
    let next = restored.place_bid(&current, Bid::new(2, 1)).unwrap();
    assert!(next.pending_bid().is_some());
}
