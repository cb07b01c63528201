//! Rule callables and the library they are registered in.
//!
//! MoveSet, SpecialMove and Macro objects carry behavior. The engine does not
//! load code from content packs; instead each rule object's sibling `.rule`
//! resource names a callable registered in the `RuleLibrary` before loading.
//!
//! ## Contract
//!
//! A rule receives a `RuleContext` (`game`, `x`, `y`, `direction`) and returns
//! the coordinates currently reachable by the piece at `(x, y)`. It may query
//! the game freely; it cannot mutate it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::board::Piece;
use crate::core::{Coord, Transform};
use crate::game::Game;

/// Arguments passed to a rule callable.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub game: &'a Game,
    pub x: i32,
    pub y: i32,
    /// Orientation of the moving player. Offsets are written facing north.
    pub direction: Transform,
}

impl<'a> RuleContext<'a> {
    /// Coordinate of the piece being moved.
    #[must_use]
    pub fn origin(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// Absolute coordinate of a north-relative offset from the origin.
    #[must_use]
    pub fn relative(&self, dx: i32, dy: i32) -> Coord {
        self.origin() + self.direction.apply(Coord::new(dx, dy))
    }

    /// The piece being moved.
    #[must_use]
    pub fn piece(&self) -> &'a Piece {
        self.game.square(self.origin()).piece()
    }
}

/// Signature every rule callable must have.
pub type RuleFn = dyn Fn(&RuleContext<'_>) -> Vec<Coord> + Send + Sync;

/// A named, shareable rule callable.
#[derive(Clone)]
pub struct Rule {
    name: Arc<str>,
    callable: Arc<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: &str, callable: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Vec<Coord> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            callable: Arc::new(callable),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the rule.
    #[must_use]
    pub fn call(&self, ctx: &RuleContext<'_>) -> Vec<Coord> {
        (self.callable)(ctx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// Callables available to content packs, by name.
#[derive(Clone, Debug, Default)]
pub struct RuleLibrary {
    rules: FxHashMap<String, Rule>,
}

impl RuleLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding the built-in rules.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.register("pawnlike", pawnlike);
        library.register("stationary", |_: &RuleContext<'_>| Vec::new());
        library
    }

    /// Register (or replace) a callable.
    pub fn register<F>(&mut self, name: &str, callable: F)
    where
        F: Fn(&RuleContext<'_>) -> Vec<Coord> + Send + Sync + 'static,
    {
        self.rules.insert(name.to_string(), Rule::new(name, callable));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Pawn-like movement.
///
/// - one square forward onto a free square
/// - two squares forward on the piece's first move, through a passable square
/// - diagonally forward onto a takeable piece
/// - diagonally forward onto a free square beside a piece liable for en passant
pub fn pawnlike(ctx: &RuleContext<'_>) -> Vec<Coord> {
    let game = ctx.game;
    let me = ctx.piece();
    let owner = me.owner();
    let mut destinations = Vec::new();

    let one_ahead = ctx.relative(0, -1);
    if game.square(one_ahead).is_free_for_player(owner) {
        destinations.push(one_ahead);
    }

    let two_ahead = ctx.relative(0, -2);
    if me.moves_made() == 0
        && game.square(one_ahead).is_passable_by_piece(me)
        && game.square(two_ahead).is_free_for_player(owner)
    {
        destinations.push(two_ahead);
    }

    for dx in [1, -1] {
        let diagonal = ctx.relative(dx, -1);
        let square = game.square(diagonal);
        if square.has_piece_takeable_by(owner) {
            destinations.push(diagonal);
        }

        // Square beside the pawn, behind the diagonal.
        let passed = diagonal + ctx.direction.apply(Coord::new(0, 1));
        if square.is_free_for_player(owner)
            && game
                .square(passed)
                .piece()
                .has_tag(super::object::tags::LIABLE_FOR_EN_PASSANT)
        {
            destinations.push(diagonal);
        }
    }

    destinations
}
