//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use rust_gridrules::core::Coord;
use rust_gridrules::content::RuleContext;
use rust_gridrules::game::Game;

pub fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn content_packs() -> PathBuf {
    fixtures().join("contentpacks")
}

pub fn scenario(name: &str) -> PathBuf {
    fixtures().join("scenarios").join(format!("{}.json", name))
}

/// One step in any direction onto a free or takeable square.
pub fn kinglike(ctx: &RuleContext<'_>) -> Vec<Coord> {
    let owner = ctx.piece().owner();
    let mut out = Vec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let target = ctx.relative(dx, dy);
            let square = ctx.game.square(target);
            if square.is_free_for_player(owner) || square.has_piece_takeable_by(owner) {
                out.push(target);
            }
        }
    }
    out
}

/// A game with the fixture packs loaded.
pub fn game_with_packs() -> Game {
    let mut game = Game::new();
    game.register_rule("kinglike", kinglike);
    game.load_content_packs(content_packs()).unwrap();
    game
}

/// A game with the fixture packs and the named scenario loaded.
pub fn game(name: &str) -> Game {
    let mut game = game_with_packs();
    game.load_game(scenario(name)).unwrap();
    game
}

/// Board tokens of `stringified_board` output, row-major.
pub fn board_tokens(dump: &str) -> Vec<String> {
    dump.lines()
        .skip(1)
        .flat_map(|row| row.split_whitespace().skip(1))
        .map(str::to_string)
        .collect()
}
