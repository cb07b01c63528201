//! Board coordinates and facing transforms.
//!
//! Coordinates are signed so movement rules can probe squares off the edge
//! of the board; `Game::square` hands back the nonexistent square for those.
//!
//! A `Transform` is the 2x2 rotation matrix derived from a player's play
//! direction. Rules describe movement relative to "north" (forward is
//! `(0, -1)`) and the transform orients it for the moving player.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A board coordinate. `x` is the column, `y` the row (row 0 is the top).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[i32; 2]> for Coord {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major 2x2 integer matrix applied to relative offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transform(pub [[i32; 2]; 2]);

impl Transform {
    pub const NORTH: Transform = Transform([[1, 0], [0, 1]]);
    pub const EAST: Transform = Transform([[0, 1], [-1, 0]]);
    pub const SOUTH: Transform = Transform([[-1, 0], [0, -1]]);
    pub const WEST: Transform = Transform([[0, -1], [1, 0]]);
    /// Collapses every offset onto the origin. Used by the base player.
    pub const NOWHERE: Transform = Transform([[0, 0], [0, 0]]);

    /// Multiply the matrix by the column vector `offset`.
    #[inline]
    #[must_use]
    pub fn apply(self, offset: Coord) -> Coord {
        let [[a, b], [c, d]] = self.0;
        Coord::new(a * offset.x + b * offset.y, c * offset.x + d * offset.y)
    }
}
