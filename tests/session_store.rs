use std::sync::Arc;

use boardhall::application::game_service::GameService;
use boardhall::application::snapshot::ActionResult;
use boardhall::config::SessionConfig;
use boardhall::domain::game::{GameStates, MoveError};
use boardhall::domain::models::{GameKind, OutcomeKind, Player, Selector};
use boardhall::infrastructure::clock::ManualClock;
use rand::SeedableRng;
use rand::rngs::StdRng;

const START: i64 = 1_700_000_000;

fn fresh_states() -> GameStates {
    GameStates::fresh(&mut StdRng::seed_from_u64(11))
}

fn service_with(states: GameStates) -> (GameService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let service = GameService::new(states, None, clock.clone(), SessionConfig::default());
    (service, clock)
}

fn service() -> (GameService, Arc<ManualClock>) {
    service_with(fresh_states())
}

fn play(
    service: &GameService,
    selector: Selector,
    session: Option<&str>,
    player: u8,
    from: &str,
    to: &str,
) -> ActionResult {
    service
        .submit_move(GameKind::Chess, selector, session, player, from, to)
        .unwrap()
}

fn fools_mate(service: &GameService, selector: Selector, p1: Option<&str>, p2: Option<&str>) -> ActionResult {
    assert!(play(service, selector, p1, 1, "f2", "f3").ok);
    assert!(play(service, selector, p2, 2, "e7", "e5").ok);
    assert!(play(service, selector, p1, 1, "g2", "g4").ok);
    play(service, selector, p2, 2, "d8", "h4")
}

#[test]
fn test_opening_move_updates_board() {
    let (service, _) = service();
    let result = play(&service, Selector::Public, None, 1, "e2", "e4");

    assert!(result.ok);
    assert_eq!(result.error, None);
    let state = result.state;
    assert_eq!(state.board[4], "....P...");
    assert_eq!(state.board[6], "PPPP.PPP");
    assert_eq!(state.current_player, Player::Two);
    assert_eq!(state.version, 1);
    assert_eq!(state.move_history, vec!["P1: e2-e4".to_string()]);
    assert_eq!(state.started_at, Some(START));
    assert_eq!(state.last_played_at, Some(START));
    assert_eq!(state.seat_info, None);
}

#[test]
fn test_coordinates_are_case_insensitive() {
    let (service, _) = service();
    let result = play(&service, Selector::Public, None, 1, "E2", "E4");
    assert!(result.ok);
    assert_eq!(result.state.move_history, vec!["P1: E2-E4".to_string()]);
}

#[test]
fn test_rejections_leave_state_untouched() {
    let (service, _) = service();
    let cases: [(u8, &str, &str, MoveError); 6] = [
        (3, "e2", "e4", MoveError::InvalidPlayer),
        (2, "e7", "e5", MoveError::NotYourTurn),
        (1, "z9", "e4", MoveError::InvalidCoordinates),
        (1, "e2", "e44", MoveError::InvalidCoordinates),
        (1, "e7", "e5", MoveError::NotYourPiece),
        (1, "e2", "e5", MoveError::IllegalMove),
    ];
    for (player, from, to, expected) in cases {
        let result = play(&service, Selector::Public, None, player, from, to);
        assert!(!result.ok);
        assert_eq!(result.error, Some(expected), "{} {}-{}", player, from, to);
        assert_eq!(result.state.version, 0);
        assert!(result.state.move_history.is_empty());
    }
}

#[test]
fn test_fools_mate_ends_game_and_counts_stats() {
    let (service, _) = service();
    let result = fools_mate(&service, Selector::Public, None, None);

    assert!(result.ok);
    let state = result.state;
    assert!(state.game_over);
    let outcome = state.result.unwrap();
    assert_eq!(outcome.title, OutcomeKind::Checkmate);
    assert_eq!(outcome.winner, Some(Player::Two));
    assert_eq!(state.stats.p2_wins, 1);
    assert_eq!(state.stats.total_games, 1);
    assert_eq!(state.version, 4);

    let after = play(&service, Selector::Public, None, 1, "e2", "e4");
    assert_eq!(after.error, Some(MoveError::GameOver));
}

#[test]
fn test_reset_requires_finished_game() {
    let (service, _) = service();
    play(&service, Selector::Public, None, 1, "e2", "e4");

    let refused = service
        .reset_game(GameKind::Chess, Selector::Public, None, 1)
        .unwrap();
    assert_eq!(refused.error, Some(MoveError::GameStillRunning));
    assert_eq!(refused.state.version, 1);

    let invalid = service
        .reset_game(GameKind::Chess, Selector::Public, None, 0)
        .unwrap();
    assert_eq!(invalid.error, Some(MoveError::InvalidPlayer));
}

#[test]
fn test_reset_keeps_stats_and_advances_version() {
    let (service, _) = service();
    fools_mate(&service, Selector::Public, None, None);

    let result = service
        .reset_game(GameKind::Chess, Selector::Public, None, 1)
        .unwrap();
    assert!(result.ok);
    let state = result.state;
    assert!(!state.game_over);
    assert_eq!(state.result, None);
    assert_eq!(state.board[6], "PPPPPPPP");
    assert!(state.move_history.is_empty());
    assert_eq!(state.stats.total_games, 1);
    assert_eq!(state.version, 5);
    assert_eq!(state.current_player, Player::One);
}

#[test]
fn test_boards_are_independent() {
    let (service, _) = service();
    play(&service, Selector::Public, None, 1, "e2", "e4");

    let seats = service
        .get_state(GameKind::Chess, Selector::Seats, None)
        .unwrap();
    assert_eq!(seats.version, 0);
    assert_eq!(seats.board[6], "PPPPPPPP");
    let tafl = service
        .get_state(GameKind::Hnefatafl, Selector::Public, None)
        .unwrap();
    assert_eq!(tafl.version, 0);
}

#[test]
fn test_hnefatafl_capture_through_service() {
    let mut states = fresh_states();
    let tafl = &mut states.games.hnefatafl.public;
    tafl.board = [
        ".........",
        ".........",
        ".........",
        ".........",
        "....K....",
        ".....D...",
        ".........",
        "...DA....",
        ".........",
    ]
    .iter()
    .map(|row| row.to_string())
    .collect();
    tafl.current_player = Player::One;
    let (service, _) = service_with(states);

    let result = service
        .submit_move(GameKind::Hnefatafl, Selector::Public, None, 1, "f4", "f2")
        .unwrap();
    assert!(result.ok);
    assert_eq!(result.state.board[7], "...D.D...");
    assert_eq!(result.state.current_player, Player::Two);
    assert!(!result.state.game_over);
}

#[test]
fn test_corrupt_board_is_an_infrastructure_error() {
    let mut states = fresh_states();
    states.games.chess.public.board = vec!["bogus".to_string()];
    let (service, _) = service_with(states);

    assert!(
        service
            .submit_move(GameKind::Chess, Selector::Public, None, 1, "e2", "e4")
            .is_err()
    );
}

#[test]
fn test_seat_claims_and_spectators() {
    let (service, _) = service();
    let alice = service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    let bob = service.claim_seat(GameKind::Chess, Some("bob")).unwrap();
    let carol = service.claim_seat(GameKind::Chess, Some("carol")).unwrap();

    assert_eq!((alice.player, bob.player, carol.player), (1, 2, 0));
    assert!(carol.ok);
    assert_eq!(carol.state.version, 3);

    let again = service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    assert_eq!(again.player, 1);
    assert_eq!(again.state.version, 4);

    let view = service
        .get_state(GameKind::Chess, Selector::Seats, Some("bob"))
        .unwrap();
    let info = view.seat_info.unwrap();
    assert!(info.p1 && info.p2);
    assert_eq!(info.player, 2);

    let spectator = service
        .get_state(GameKind::Chess, Selector::Seats, Some("carol"))
        .unwrap();
    assert_eq!(spectator.seat_info.unwrap().player, 0);
}

#[test]
fn test_claim_without_session_mints_one() {
    let (service, _) = service();
    let claim = service.claim_seat(GameKind::Hnefatafl, None).unwrap();
    assert_eq!(claim.player, 1);
    let minted = claim.session_id.unwrap();
    assert_eq!(minted.len(), 32);

    let view = service
        .get_state(GameKind::Hnefatafl, Selector::Seats, Some(&minted))
        .unwrap();
    assert_eq!(view.seat_info.unwrap().player, 1);
}

#[test]
fn test_seated_moves_need_the_matching_seat() {
    let (service, _) = service();
    service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    service.claim_seat(GameKind::Chess, Some("bob")).unwrap();

    let stranger = play(&service, Selector::Seats, Some("carol"), 1, "e2", "e4");
    assert_eq!(stranger.error, Some(MoveError::SeatRequired));
    let anonymous = play(&service, Selector::Seats, None, 1, "e2", "e4");
    assert_eq!(anonymous.error, Some(MoveError::SeatRequired));
    let impostor = play(&service, Selector::Seats, Some("bob"), 1, "e2", "e4");
    assert_eq!(impostor.error, Some(MoveError::SeatMismatch));

    let owner = play(&service, Selector::Seats, Some("alice"), 1, "e2", "e4");
    assert!(owner.ok);
    assert_eq!(owner.state.current_player, Player::Two);
}

#[test]
fn test_idle_seat_of_side_to_move_expires() {
    let (service, clock) = service();
    service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    service.claim_seat(GameKind::Chess, Some("bob")).unwrap();
    clock.advance(200);
    assert!(play(&service, Selector::Seats, Some("alice"), 1, "e2", "e4").ok);

    clock.advance(101);
    let before = service
        .get_state(GameKind::Chess, Selector::Seats, Some("alice"))
        .unwrap();
    // Bob was seated 301 seconds ago and is the side to move.
    let info = before.seat_info.unwrap();
    assert!(info.p1);
    assert!(!info.p2);
    assert_eq!(info.player, 1);
    assert_eq!(before.version, 4);

    let dave = service.claim_seat(GameKind::Chess, Some("dave")).unwrap();
    assert_eq!(dave.player, 2);
    assert!(play(&service, Selector::Seats, Some("dave"), 2, "e7", "e5").ok);
}

#[test]
fn test_waiting_side_keeps_its_seat() {
    let (service, clock) = service();
    service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    service.claim_seat(GameKind::Chess, Some("bob")).unwrap();
    assert!(play(&service, Selector::Seats, Some("alice"), 1, "e2", "e4").ok);
    assert!(play(&service, Selector::Seats, Some("bob"), 2, "e7", "e5").ok);

    // Alice is to move; Bob has been idle just as long but is waiting.
    clock.advance(1_000);
    let view = service
        .get_state(GameKind::Chess, Selector::Seats, None)
        .unwrap();
    let info = view.seat_info.unwrap();
    assert!(!info.p1);
    assert!(info.p2);
}

#[test]
fn test_seated_reset_keeps_seats() {
    let (service, _) = service();
    service.claim_seat(GameKind::Chess, Some("alice")).unwrap();
    service.claim_seat(GameKind::Chess, Some("bob")).unwrap();
    let mate = fools_mate(&service, Selector::Seats, Some("alice"), Some("bob"));
    assert!(mate.state.game_over);

    let refused = service
        .reset_game(GameKind::Chess, Selector::Seats, Some("carol"), 1)
        .unwrap();
    assert_eq!(refused.error, Some(MoveError::SeatRequired));
    let wrong_seat = service
        .reset_game(GameKind::Chess, Selector::Seats, Some("bob"), 1)
        .unwrap();
    assert_eq!(wrong_seat.error, Some(MoveError::SeatRequired));

    let reset = service
        .reset_game(GameKind::Chess, Selector::Seats, Some("bob"), 2)
        .unwrap();
    assert!(reset.ok);
    let info = reset.state.seat_info.unwrap();
    assert!(info.p1 && info.p2);
    assert_eq!(info.player, 2);
    assert_eq!(reset.state.stats.total_games, 1);
}

#[test]
fn test_history_is_capped() {
    let clock = Arc::new(ManualClock::new(START));
    let settings = SessionConfig {
        max_history: 3,
        ..SessionConfig::default()
    };
    let service = GameService::new(fresh_states(), None, clock, settings);

    for (player, from, to) in [
        (1, "g1", "f3"),
        (2, "g8", "f6"),
        (1, "f3", "g1"),
        (2, "f6", "g8"),
    ] {
        assert!(play(&service, Selector::Public, None, player, from, to).ok);
    }
    let state = service
        .get_state(GameKind::Chess, Selector::Public, None)
        .unwrap();
    assert_eq!(
        state.move_history,
        vec!["P2: g8-f6", "P1: f3-g1", "P2: f6-g8"]
    );
}
