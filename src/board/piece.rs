//! Pieces: placed instances of a piece type.
//!
//! A `Piece` is owned by exactly one `Square`. It remembers the coordinate
//! of that square, but only `Square::set_piece` may change it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::content::{tags, PieceType, RuleContext};
use crate::core::{Coord, PlayerId, StateFault};
use crate::game::Game;

/// A piece on (or removed from) the board.
///
/// ## Tags
///
/// Tags are tri-state per instance: explicitly enabled, explicitly disabled,
/// or unset. Unset tags fall back to the piece type's default, and a tag
/// neither side mentions is false.
///
/// ```
/// use std::sync::Arc;
/// use rust_gridrules::board::Piece;
/// use rust_gridrules::content::PieceType;
/// use rust_gridrules::core::PlayerId;
///
/// let knight = Arc::new(PieceType::new("orthochess", "knight", "Knight").with_tag("canJump", true));
/// let mut piece = Piece::new(PlayerId::new(1), knight);
///
/// assert!(piece.has_tag("canJump"));
/// piece.disable_tag("canJump");
/// assert!(!piece.has_tag("canJump"));
/// piece.default_tag("canJump");
/// assert!(piece.has_tag("canJump"));
/// ```
#[derive(Clone, Debug)]
pub struct Piece {
    owner: PlayerId,
    piece_type: Arc<PieceType>,
    tags: FxHashMap<String, bool>,
    vital: bool,
    moves_made: u32,
    square: Option<Coord>,
    shorthand: Option<char>,
}

impl Piece {
    /// Create an unplaced, non-vital piece.
    #[must_use]
    pub fn new(owner: PlayerId, piece_type: Arc<PieceType>) -> Self {
        Self {
            owner,
            piece_type,
            tags: FxHashMap::default(),
            vital: false,
            moves_made: 0,
            square: None,
            shorthand: None,
        }
    }

    /// Create an empty sentinel owned by the base player.
    #[must_use]
    pub fn empty(empty_type: Arc<PieceType>) -> Self {
        Self::new(PlayerId::BASE, empty_type)
    }

    /// Mark whether this piece must survive for its owner to stay in the game.
    #[must_use]
    pub fn with_vital(mut self, vital: bool) -> Self {
        self.vital = vital;
        self
    }

    /// Record the scenario shorthand this piece was placed with. Several
    /// shorthands may name the same piece type.
    #[must_use]
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn piece_type(&self) -> &Arc<PieceType> {
        &self.piece_type
    }

    pub fn is_vital(&self) -> bool {
        self.vital
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    /// Board shorthand from the scenario, if the piece came from one.
    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    /// Coordinate of the square holding this piece.
    pub fn square(&self) -> Option<Coord> {
        self.square
    }

    /// Is this the empty sentinel?
    pub fn is_ghost(&self) -> bool {
        self.has_tag(tags::GHOST)
    }

    pub(crate) fn place(&mut self, square: Option<Coord>) {
        self.square = square;
    }

    pub(crate) fn increment_moves_made(&mut self) {
        self.moves_made += 1;
    }

    pub fn enable_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into(), true);
    }

    pub fn disable_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into(), false);
    }

    /// Clear the instance override so the type default applies again.
    pub fn default_tag(&mut self, tag: &str) {
        self.tags.remove(tag);
    }

    /// Instance override for `tag`, if any.
    pub fn tag_override(&self, tag: &str) -> Option<bool> {
        self.tags.get(tag).copied()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_override(tag)
            .unwrap_or_else(|| self.piece_type.has_tag(tag))
    }

    /// Coordinates this piece can currently reach, per its move set.
    ///
    /// Computed from the current board each call. A piece type without a
    /// move set reaches nothing.
    pub fn moveable_square_coordinates(&self, game: &Game) -> Result<Vec<Coord>, StateFault> {
        let origin = self.square.ok_or(StateFault::Unplaced)?;
        let owner = game
            .players()
            .get(self.owner)
            .ok_or(StateFault::UnknownPlayer(self.owner))?;

        let Some(move_set) = &self.piece_type.move_set else {
            return Ok(Vec::new());
        };
        let ctx = RuleContext {
            game,
            x: origin.x,
            y: origin.y,
            direction: owner.play_direction().transform(),
        };
        Ok(move_set.rule.call(&ctx))
    }
}
