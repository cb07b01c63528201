//! Core engine types: coordinates, players, configuration, errors.
//!
//! These are shared by the content, board and game layers and carry no
//! game-specific rules.

pub mod config;
pub mod coord;
pub mod error;
pub mod player;

pub use config::{EngineConfig, LATEST_CONTENT_PACK_FORMAT};
pub use coord::{Coord, Transform};
pub use error::{ContentPackLoadError, GameLoadError, StateFault};
pub use player::{PlayDirection, Player, PlayerId, Roster, BASE_PLAYER_ID, BASE_SHORTHAND};
