//! Engine configuration.
//!
//! Games configure the engine at startup with an `EngineConfig`. Every field
//! has a default, so a config file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

/// Content-pack format version this engine understands.
pub const LATEST_CONTENT_PACK_FORMAT: u32 = 1;

/// Engine-wide settings.
///
/// ## Example
///
/// ```
/// use rust_gridrules::core::EngineConfig;
///
/// let config = EngineConfig::default().keep_eliminated_pieces();
/// assert!(!config.destroy_eliminated_pieces);
/// assert_eq!(config.pack_format, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// `packFormat` every loaded manifest must declare.
    pub pack_format: u32,

    /// Remove every piece of a player from the board when they are eliminated.
    pub destroy_eliminated_pieces: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pack_format: LATEST_CONTENT_PACK_FORMAT,
            destroy_eliminated_pieces: true,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept content packs of a different format version.
    #[must_use]
    pub fn with_pack_format(mut self, format: u32) -> Self {
        self.pack_format = format;
        self
    }

    /// Leave an eliminated player's pieces on the board.
    #[must_use]
    pub fn keep_eliminated_pieces(mut self) -> Self {
        self.destroy_eliminated_pieces = false;
        self
    }
}
