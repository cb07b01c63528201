//! Error types.
//!
//! - `ContentPackLoadError`: fatal to a content-pack load
//! - `GameLoadError`: fatal to a scenario load
//! - `StateFault`: internal-consistency violation (a programming error)
//!
//! Rejected moves are not errors; see `game::MoveOutcome`.

use std::path::PathBuf;

use super::coord::Coord;
use super::player::PlayerId;

/// Errors that abort `ContentPackRegistry::load_content_packs`.
#[derive(Debug, thiserror::Error)]
pub enum ContentPackLoadError {
    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON formatting for pack.json of '{pack}'")]
    Manifest {
        pack: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("wrong pack format: current content pack format is {expected}, but content pack '{pack}' has format {found}")]
    PackFormat { pack: String, found: u32, expected: u32 },

    #[error("content pack id '{0}' is reserved")]
    ReservedPack(String),

    #[error("content pack '{0}' is already loaded")]
    DuplicatePack(String),

    #[error("invalid JSON formatting for object file '{}'", .path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid object definition '{}': {reason}", .path.display())]
    InvalidDefinition { path: PathBuf, reason: String },

    #[error("duplicate object '{pack}:{class}:{id}'")]
    DuplicateObject {
        pack: String,
        class: &'static str,
        id: String,
    },

    #[error("invalid or nonexistent {class} rule file '{}'", .path.display())]
    MissingRule {
        class: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{class} '{id}' names unknown rule callable '{rule}'")]
    UnknownRule {
        class: &'static str,
        id: String,
        rule: String,
    },

    #[error("nonexistent object reference in '{pack}:{class}:{id}': '{field}: {reference}'")]
    UnresolvedReference {
        pack: String,
        class: &'static str,
        id: String,
        field: String,
        reference: String,
    },
}

/// Errors that abort `Game::load_game`.
///
/// The `Display` output names the scenario section that failed.
#[derive(Debug, thiserror::Error)]
pub enum GameLoadError {
    #[error("could not read scenario file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid JSON file")]
    Json(#[from] serde_json::Error),

    #[error("'{0}' attribute incorrectly defined")]
    Section(&'static str),

    #[error("could not load content packs: missing content pack '{0}'")]
    MissingContentPack(String),

    #[error("could not load players: cannot have 0 players")]
    NoPlayers,

    #[error("could not load players: shorthand identifier '{0}' is invalid or reserved")]
    InvalidPlayerShorthand(String),

    #[error("could not load players: invalid player '{shorthand}': {reason}")]
    InvalidPlayer { shorthand: String, reason: String },

    #[error("could not load players: player id '{0}' is already in use")]
    DuplicatePlayer(String),

    #[error("could not load players: must have at least one user-controlled player")]
    NoUserControlledPlayer,

    #[error("could not load play order: shorthand identifier '{0}' has no associated player")]
    UnknownPlayOrderShorthand(char),

    #[error("could not load play order: play order cannot include NPCs ('{0}' is an NPC)")]
    NpcInPlayOrder(String),

    #[error("could not load pieces: invalid or reused shorthand identifier '{0}'")]
    InvalidPieceShorthand(String),

    #[error("could not load pieces: nonexistent piece type reference '{0}'")]
    UnknownPieceType(String),

    #[error("could not load board: invalid board dimensions {width} by {height}")]
    InvalidDimensions { width: String, height: String },

    #[error("could not load board: board string has {found} squares (should be {expected})")]
    BoardLength { found: usize, expected: usize },

    #[error("could not load board: malformed token '{token}' at square {coord}")]
    InvalidToken { token: String, coord: Coord },

    #[error("could not load board: undefined player shorthand identifier '{shorthand}' at square {coord}")]
    UnknownBoardPlayer { shorthand: char, coord: Coord },

    #[error("could not load board: undefined piece type shorthand identifier '{shorthand}' at square {coord}")]
    UnknownBoardPiece { shorthand: char, coord: Coord },
}

/// Internal-consistency violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateFault {
    #[error("square {0} is not on the board")]
    OffBoard(Coord),

    #[error("piece on square {square} records its square as {recorded:?}")]
    Desynchronized {
        square: Coord,
        recorded: Option<Coord>,
    },

    #[error("piece is not on the board")]
    Unplaced,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("the base player cannot be eliminated")]
    BasePlayer,

    #[error("rule callable failed: {0}")]
    RulePanicked(String),
}
