//! Board model: pieces, squares and the grid that holds them.

pub mod grid;
pub mod piece;
pub mod square;

pub use grid::Board;
pub use piece::Piece;
pub use square::{Square, StatusList};
