//! # rust-gridrules
//!
//! A rules engine for turn-based games played on a grid: chess and its
//! variants, and anything else that fits "players take turns moving pieces
//! between squares".
//!
//! ## Design Principles
//!
//! 1. **Data-Driven**: Piece types, piece classes and move sets come from
//!    content packs on disk. The engine hardcodes no pieces.
//!
//! 2. **Named Rules**: Movement is computed by rule callables registered in
//!    a `RuleLibrary` by name. Content packs refer to them by that name.
//!
//! 3. **Check Before Mutate**: A move is validated completely before any
//!    state changes, so a rejected move leaves the game untouched.
//!
//! ## Loading
//!
//! ```text
//! ContentPackRegistry::load_content_packs(dir)   resolve @pack:id references
//!           │
//! Game::load_game(scenario.json)                 players, play order, board
//!           │
//! Game::attempt_move(player, start, dest)        validate, apply, advance turn
//! ```
//!
//! ## Modules
//!
//! - `core`: Coordinates, players, configuration and errors
//! - `content`: Content-pack objects, references, rule callables, registry
//! - `board`: Pieces, squares and the board grid
//! - `game`: Scenario loading, turn order and the `Game` orchestrator

pub mod board;
pub mod content;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    Coord, Transform,
    EngineConfig, LATEST_CONTENT_PACK_FORMAT,
    ContentPackLoadError, GameLoadError, StateFault,
    PlayDirection, Player, PlayerId, Roster,
};

pub use crate::content::{
    ContentPack, ContentPackObject, ContentPackRegistry, ObjectClass, ObjectKey,
    PieceClass, PieceType, Reference, RuleObject,
    Rule, RuleContext, RuleLibrary,
};

pub use crate::board::{Board, Piece, Square, StatusList};

pub use crate::game::{Game, MoveOutcome, ScenarioInfo, TurnOrder};
