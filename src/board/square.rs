//! Squares: board cells.
//!
//! A square always holds exactly one piece. When nothing is there, that
//! piece is an empty sentinel owned by the base player.
//!
//! Each square also keeps four per-player status lists that rules consult:
//!
//! - `Trapped`
//! - `Protected`: pieces of listed players here cannot be taken
//! - `Blind`
//! - `Blocked`: listed players cannot move onto or take on this square
//!
//! ## Nonexistent square
//!
//! `Game::square` returns a nonexistent square for off-board coordinates. It
//! has no coordinates, never holds a piece, answers `false` to every
//! occupancy query and ignores every mutation.

use std::sync::Arc;

use smallvec::SmallVec;

use super::piece::Piece;
use crate::content::{tags, PieceType};
use crate::core::{Coord, PlayerId, Roster, StateFault};

/// The per-player status lists a square carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusList {
    Trapped,
    Protected,
    Blind,
    Blocked,
}

#[derive(Clone, Debug, Default)]
struct StatusLists {
    trapped: SmallVec<[PlayerId; 2]>,
    protected: SmallVec<[PlayerId; 2]>,
    blind: SmallVec<[PlayerId; 2]>,
    blocked: SmallVec<[PlayerId; 2]>,
}

impl StatusLists {
    fn get(&self, list: StatusList) -> &SmallVec<[PlayerId; 2]> {
        match list {
            StatusList::Trapped => &self.trapped,
            StatusList::Protected => &self.protected,
            StatusList::Blind => &self.blind,
            StatusList::Blocked => &self.blocked,
        }
    }

    fn get_mut(&mut self, list: StatusList) -> &mut SmallVec<[PlayerId; 2]> {
        match list {
            StatusList::Trapped => &mut self.trapped,
            StatusList::Protected => &mut self.protected,
            StatusList::Blind => &mut self.blind,
            StatusList::Blocked => &mut self.blocked,
        }
    }
}

/// One board cell.
#[derive(Clone, Debug)]
pub struct Square {
    coord: Option<Coord>,
    piece: Piece,
    lists: StatusLists,
    empty_type: Arc<PieceType>,
}

impl Square {
    /// Create an on-board square holding `piece`.
    pub(crate) fn new(coord: Coord, mut piece: Piece, empty_type: Arc<PieceType>) -> Self {
        piece.place(Some(coord));
        Self {
            coord: Some(coord),
            piece,
            lists: StatusLists::default(),
            empty_type,
        }
    }

    pub(crate) fn nonexistent(empty_type: Arc<PieceType>) -> Self {
        Self {
            coord: None,
            piece: Piece::empty(Arc::clone(&empty_type)),
            lists: StatusLists::default(),
            empty_type,
        }
    }

    /// Coordinates, or `None` for the nonexistent square.
    pub fn coord(&self) -> Option<Coord> {
        self.coord
    }

    pub fn x(&self) -> Option<i32> {
        self.coord.map(|c| c.x)
    }

    pub fn y(&self) -> Option<i32> {
        self.coord.map(|c| c.y)
    }

    /// Is this a real board square?
    pub fn exists(&self) -> bool {
        self.coord.is_some()
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// Mutable access for tag edits. The piece's square cannot be changed
    /// through this.
    pub fn piece_mut(&mut self) -> &mut Piece {
        &mut self.piece
    }

    /// Holds something other than the empty sentinel.
    pub fn has_piece(&self) -> bool {
        self.exists() && !self.piece.has_tag(tags::GHOST)
    }

    /// Holds a piece `player` may take by normal means.
    pub fn has_piece_takeable_by(&self, player: PlayerId) -> bool {
        self.has_piece()
            && !self.piece.has_tag(tags::UNTAKEABLE)
            && self.piece.owner() != player
            && !self.is_player_in_list(StatusList::Blocked, player)
            && !self.is_player_in_list(StatusList::Protected, self.piece.owner())
    }

    /// Empty and not blocked for `player`.
    pub fn is_free_for_player(&self, player: PlayerId) -> bool {
        self.exists() && !self.has_piece() && !self.is_player_in_list(StatusList::Blocked, player)
    }

    /// Empty, or holding a piece `piece` can jump over.
    pub fn is_passable_by_piece(&self, piece: &Piece) -> bool {
        self.exists()
            && (!self.has_piece()
                || (piece.has_tag(tags::CAN_JUMP) && !self.piece.has_tag(tags::UNJUMPABLE)))
    }

    /// Put `piece` here and return the displaced occupant, now unplaced.
    ///
    /// On the nonexistent square nothing changes and `piece` is handed back.
    pub fn set_piece(&mut self, mut piece: Piece) -> Piece {
        let Some(coord) = self.coord else {
            return piece;
        };
        piece.place(Some(coord));
        let mut displaced = std::mem::replace(&mut self.piece, piece);
        displaced.place(None);
        displaced
    }

    /// Capture the occupant on behalf of `player`: record it against them,
    /// award its point value as gold, then destroy it.
    pub fn take_piece_by(&mut self, player: PlayerId, roster: &mut Roster) -> Result<(), StateFault> {
        if roster.get(player).is_none() {
            return Err(StateFault::UnknownPlayer(player));
        }
        let Some(taken) = self.destroy_piece(roster)? else {
            return Ok(());
        };
        let value = taken.piece_type().point_value;
        let taker = &mut roster[player];
        taker.add_captured_piece(taken);
        taker.add_gold(value);
        Ok(())
    }

    /// Remove the occupant: record the loss against its owner, decrement the
    /// owner's vital count if it was vital, and leave an empty sentinel.
    ///
    /// Returns the removed piece, or `None` if there was nothing to remove.
    pub fn destroy_piece(&mut self, roster: &mut Roster) -> Result<Option<Piece>, StateFault> {
        let Some(coord) = self.coord else {
            return Ok(None);
        };
        if !self.has_piece() {
            return Ok(None);
        }
        if self.piece.square() != Some(coord) {
            return Err(StateFault::Desynchronized {
                square: coord,
                recorded: self.piece.square(),
            });
        }
        let owner_id = self.piece.owner();
        if roster.get(owner_id).is_none() {
            return Err(StateFault::UnknownPlayer(owner_id));
        }

        let removed = self.set_piece(Piece::empty(Arc::clone(&self.empty_type)));
        let owner = &mut roster[owner_id];
        owner.add_lost_piece(removed.clone());
        if removed.is_vital() {
            owner.add_vital_piece_count(-1);
        }
        Ok(Some(removed))
    }

    /// Add `player` to a status list. Ignored on the nonexistent square,
    /// for players already blocked here, and for players already listed.
    pub fn add_player_to_list(&mut self, list: StatusList, player: PlayerId) {
        if !self.exists()
            || self.is_player_in_list(StatusList::Blocked, player)
            || self.is_player_in_list(list, player)
        {
            return;
        }
        self.lists.get_mut(list).push(player);
    }

    pub fn remove_player_from_list(&mut self, list: StatusList, player: PlayerId) {
        self.lists.get_mut(list).retain(|p| *p != player);
    }

    pub fn is_player_in_list(&self, list: StatusList, player: PlayerId) -> bool {
        self.lists.get(list).contains(&player)
    }

    pub fn players_in_list(&self, list: StatusList) -> &[PlayerId] {
        self.lists.get(list)
    }
}
