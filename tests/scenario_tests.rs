//! Scenario loading tests.
//!
//! These tests verify that each scenario section is validated in order and
//! that a failed load leaves the game as it was.

mod common;

use rust_gridrules::core::{Coord, GameLoadError, PlayDirection};
use rust_gridrules::game::Game;
use serde_json::{json, Value};

fn base_scenario() -> Value {
    json!({
        "name": "Duel",
        "description": "Two pawns.",
        "author": "gridrules",
        "contentPacks": ["orthochess"],
        "players": {
            "1": {"id": "white", "name": "White", "isUserControlled": true, "color": "#ffffff", "gold": 5},
            "2": {"id": "black", "name": "Black", "isUserControlled": true, "playDirection": "south"}
        },
        "playOrder": "12",
        "pieces": {"p": "@orthochess:pawn"},
        "boardWidth": 2,
        "boardHeight": 2,
        "board": "2p 00 00 1p*"
    })
}

fn load(game: &mut Game, scenario: &Value) -> Result<(), GameLoadError> {
    game.load_game_str(&scenario.to_string()).map(|_| ())
}

fn load_err(edit: impl FnOnce(&mut Value)) -> GameLoadError {
    let mut scenario = base_scenario();
    edit(&mut scenario);
    let mut game = common::game_with_packs();
    load(&mut game, &scenario).unwrap_err()
}

#[test]
fn test_valid_scenario() {
    let mut game = common::game_with_packs();
    load(&mut game, &base_scenario()).unwrap();

    assert_eq!(game.info().name.as_deref(), Some("Duel"));
    assert_eq!(game.info().author.as_deref(), Some("gridrules"));
    assert_eq!(game.content_packs(), &["orthochess".to_string()]);
    assert_eq!(game.board().width(), 2);
    assert_eq!(game.board().height(), 2);

    let white = game.player_by_id("white").unwrap();
    assert_eq!(white.color(), "#ffffff");
    assert_eq!(white.gold(), 5);
    assert_eq!(white.vital_piece_count(), 1);
    assert_eq!(white.play_direction(), PlayDirection::North);

    let black = game.player_by_id("black").unwrap();
    assert_eq!(black.play_direction(), PlayDirection::South);
    assert_eq!(black.vital_piece_count(), 0);

    assert!(game.square(Coord::new(1, 1)).piece().is_vital());
    assert!(game.player_by_id("base").is_some());
    assert!(game.player_by_id("red").is_none());
}

#[test]
fn test_load_from_file() {
    let game = common::game("orthochess");
    assert_eq!(game.players().len(), 3);
    assert_eq!(game.play_order().len(), 2);
    assert_eq!(game.info().name.as_deref(), Some("Pawns and kings"));
}

#[test]
fn test_missing_file() {
    let mut game = common::game_with_packs();
    let err = game.load_game(common::scenario("missing")).unwrap_err();
    assert!(matches!(err, GameLoadError::Io { .. }));
}

#[test]
fn test_invalid_json() {
    let mut game = common::game_with_packs();
    let err = game.load_game_str("{\"players\": ").unwrap_err();
    assert!(matches!(err, GameLoadError::Json(_)));
    assert_eq!(err.to_string(), "not a valid JSON file");
}

#[test]
fn test_missing_content_pack() {
    let err = load_err(|s| s["contentPacks"] = json!(["orthochess", "shogi"]));
    assert!(matches!(err, GameLoadError::MissingContentPack(ref p) if p == "shogi"));

    let err = load_err(|s| s["contentPacks"] = json!("orthochess"));
    assert!(matches!(err, GameLoadError::Section("contentPacks")));
}

#[test]
fn test_player_errors() {
    let err = load_err(|s| s["players"] = json!({}));
    assert!(matches!(err, GameLoadError::NoPlayers));

    let err = load_err(|s| {
        s["players"]["0"] = json!({"id": "grey", "name": "Grey", "isUserControlled": true})
    });
    assert!(matches!(err, GameLoadError::InvalidPlayerShorthand(ref k) if k == "0"));

    let err = load_err(|s| s["players"]["1"] = json!({"id": "white", "isUserControlled": true}));
    assert!(matches!(err, GameLoadError::InvalidPlayer { ref shorthand, .. } if shorthand == "1"));

    let err = load_err(|s| s["players"]["1"]["id"] = json!("black"));
    assert!(matches!(err, GameLoadError::DuplicatePlayer(ref id) if id == "black"));

    let err = load_err(|s| s["players"]["1"]["id"] = json!("base"));
    assert!(matches!(err, GameLoadError::DuplicatePlayer(_)));

    let err = load_err(|s| {
        s["players"]["1"]["isUserControlled"] = json!(false);
        s["players"]["2"]["isUserControlled"] = json!(false);
    });
    assert!(matches!(err, GameLoadError::NoUserControlledPlayer));
}

#[test]
fn test_play_order_errors() {
    let err = load_err(|s| s["playOrder"] = json!("123"));
    assert!(matches!(err, GameLoadError::UnknownPlayOrderShorthand('3')));

    let err = load_err(|s| s["playOrder"] = json!(""));
    assert!(matches!(err, GameLoadError::Section("playOrder")));

    let err = load_err(|s| s["players"]["2"]["isUserControlled"] = json!(false));
    assert!(matches!(err, GameLoadError::NpcInPlayOrder(ref id) if id == "black"));
    assert!(err.to_string().starts_with("could not load play order"));
}

#[test]
fn test_piece_errors() {
    let err = load_err(|s| s["pieces"] = json!({"p": "@orthochess:pawn", "pp": "@orthochess:king"}));
    assert!(matches!(err, GameLoadError::InvalidPieceShorthand(ref k) if k == "pp"));

    let err = load_err(|s| s["pieces"] = json!({"0": "@orthochess:pawn"}));
    assert!(matches!(err, GameLoadError::InvalidPieceShorthand(_)));

    let err = load_err(|s| s["pieces"] = json!({"p": "@orthochess:queen"}));
    assert!(matches!(err, GameLoadError::UnknownPieceType(ref r) if r == "@orthochess:queen"));

    // A move set is not a piece type.
    let err = load_err(|s| s["pieces"] = json!({"p": "@orthochess:pawnlike"}));
    assert!(matches!(err, GameLoadError::UnknownPieceType(_)));
}

#[test]
fn test_board_errors() {
    let err = load_err(|s| s["boardWidth"] = json!(0));
    assert!(matches!(err, GameLoadError::InvalidDimensions { .. }));
    assert_eq!(
        err.to_string(),
        "could not load board: invalid board dimensions 0 by 2"
    );

    let err = load_err(|s| s["boardHeight"] = json!("two"));
    assert!(matches!(err, GameLoadError::InvalidDimensions { .. }));

    let err = load_err(|s| s["board"] = json!("2p 00 00"));
    assert!(matches!(err, GameLoadError::BoardLength { found: 3, expected: 4 }));

    let err = load_err(|s| s["board"] = json!(["2p", "00", "00", "1p"]));
    assert!(matches!(err, GameLoadError::Section("board")));

    let err = load_err(|s| s["board"] = json!("2p 00 00 3p"));
    assert!(matches!(
        err,
        GameLoadError::UnknownBoardPlayer { shorthand: '3', coord } if coord == Coord::new(1, 1)
    ));
}

#[test]
fn test_failed_load_keeps_previous_game() {
    let mut game = common::game("orthochess");
    let before = game.stringified_board();

    let mut scenario = base_scenario();
    scenario["playOrder"] = json!("19");
    assert!(load(&mut game, &scenario).is_err());

    assert_eq!(game.stringified_board(), before);
    assert_eq!(game.board().width(), 8);
    assert_eq!(game.info().name.as_deref(), Some("Pawns and kings"));
}

#[test]
fn test_reload_replaces_game() {
    let mut game = common::game("orthochess");
    load(&mut game, &base_scenario()).unwrap();

    assert_eq!(game.board().width(), 2);
    assert!(!game.is_won());
    assert_eq!(game.turn(), 0);
    assert_eq!(game.current_player(), game.player_id("white"));
}

#[test]
fn test_aliased_piece_shorthands_round_trip() {
    let mut scenario = base_scenario();
    scenario["pieces"] = json!({"p": "@orthochess:pawn", "q": "@orthochess:pawn"});
    scenario["board"] = json!("2q 00 00 1p*");

    let mut game = common::game_with_packs();
    load(&mut game, &scenario).unwrap();

    let tokens = common::board_tokens(&game.stringified_board());
    assert_eq!(tokens, vec!["2q", "00", "00", "1p*"]);
    assert_eq!(game.square(Coord::new(0, 0)).piece().piece_type().id, "pawn");
}
