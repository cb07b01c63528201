//! The fixed-size grid of squares.

use std::sync::Arc;

use super::piece::Piece;
use super::square::Square;
use crate::content::PieceType;
use crate::core::{Coord, StateFault};

/// A `width` × `height` grid, stored row-major.
///
/// `(0, 0)` is the top-left square; `y` grows downward.
#[derive(Clone, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    squares: Vec<Square>,
    nonexistent: Square,
}

impl Board {
    /// Build a board, asking `place` for the piece on each square in
    /// row-major order.
    pub fn new(
        width: u32,
        height: u32,
        empty_type: Arc<PieceType>,
        mut place: impl FnMut(Coord) -> Piece,
    ) -> Self {
        let mut squares = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let coord = Coord::new(x, y);
                squares.push(Square::new(coord, place(coord), Arc::clone(&empty_type)));
            }
        }
        Self {
            width,
            height,
            squares,
            nonexistent: Square::nonexistent(empty_type),
        }
    }

    /// A board with no squares.
    pub fn empty(empty_type: Arc<PieceType>) -> Self {
        Self {
            width: 0,
            height: 0,
            squares: Vec::new(),
            nonexistent: Square::nonexistent(empty_type),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as u32) < self.width && (coord.y as u32) < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.y as usize * self.width as usize + coord.x as usize)
    }

    /// The square at `coord`, or the nonexistent square off the board.
    pub fn square(&self, coord: Coord) -> &Square {
        match self.index(coord) {
            Some(i) => &self.squares[i],
            None => &self.nonexistent,
        }
    }

    /// Mutable square at `coord`, if it is on the board.
    pub fn square_mut(&mut self, coord: Coord) -> Option<&mut Square> {
        let i = self.index(coord)?;
        Some(&mut self.squares[i])
    }

    /// Like `square_mut`, but off-board coordinates are a fault.
    pub fn square_checked_mut(&mut self, coord: Coord) -> Result<&mut Square, StateFault> {
        self.square_mut(coord).ok_or(StateFault::OffBoard(coord))
    }

    /// Every on-board square, row-major.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter()
    }

    pub fn squares_mut(&mut self) -> impl Iterator<Item = &mut Square> {
        self.squares.iter_mut()
    }

    /// Check that every piece records the square holding it.
    pub fn verify(&self) -> Result<(), StateFault> {
        for square in &self.squares {
            if square.piece().square() != square.coord() {
                return Err(StateFault::Desynchronized {
                    square: square.coord().unwrap_or_default(),
                    recorded: square.piece().square(),
                });
            }
        }
        Ok(())
    }
}
