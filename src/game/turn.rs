//! Turn-order state machine.
//!
//! State is `(pointer, turn, forward)` over a play order of players. Each
//! step moves the pointer one place in the current direction; wrapping past
//! either end starts a new turn.

use crate::core::PlayerId;

/// The play order and whose turn it is.
///
/// ## Example
///
/// ```
/// use rust_gridrules::core::PlayerId;
/// use rust_gridrules::game::TurnOrder;
///
/// let white = PlayerId::new(1);
/// let black = PlayerId::new(2);
/// let mut order = TurnOrder::new(vec![white, black]);
///
/// assert_eq!(order.current(), Some(white));
/// order.increment(1);
/// assert_eq!(order.current(), Some(black));
/// order.increment(1);
/// assert_eq!(order.current(), Some(white));
/// assert_eq!(order.turn(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOrder {
    order: Vec<PlayerId>,
    pointer: usize,
    turn: u32,
    forward: bool,
}

impl Default for TurnOrder {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TurnOrder {
    /// Start at the first entry, turn 0, playing forward.
    #[must_use]
    pub fn new(order: Vec<PlayerId>) -> Self {
        Self {
            order,
            pointer: 0,
            turn: 0,
            forward: true,
        }
    }

    /// Play order entries. A player may appear more than once.
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Completed passes through the play order.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.order.contains(&player)
    }

    /// Whose turn it is.
    pub fn current(&self) -> Option<PlayerId> {
        self.order.get(self.pointer).copied()
    }

    /// Take `steps` single steps. Zero steps only brings an out-of-range
    /// pointer back onto the order.
    pub fn increment(&mut self, steps: u32) {
        if self.order.is_empty() {
            self.pointer = 0;
            return;
        }
        if steps == 0 {
            if self.pointer >= self.order.len() {
                self.pointer = 0;
                self.turn += 1;
            }
            return;
        }
        for _ in 0..steps {
            self.step();
        }
    }

    fn step(&mut self) {
        let last = self.order.len() - 1;
        if self.forward {
            if self.pointer >= last {
                self.pointer = 0;
                self.turn += 1;
            } else {
                self.pointer += 1;
            }
        } else if self.pointer == 0 || self.pointer > last {
            self.pointer = last;
            self.turn += 1;
        } else {
            self.pointer -= 1;
        }
    }

    /// Flip the direction of play.
    pub fn reverse(&mut self) {
        self.forward = !self.forward;
    }

    /// Remove every entry for `player`, returning how many were removed.
    ///
    /// The pointer is shifted so that the player who held the turn keeps it.
    /// If that was `player`, the turn passes to the next remaining entry in
    /// the current direction of play.
    pub fn remove_player(&mut self, player: PlayerId) -> usize {
        let held_turn = self.current() == Some(player);
        let end = self.pointer.min(self.order.len());
        let before = self.order[..end].iter().filter(|p| **p == player).count();
        let len = self.order.len();
        self.order.retain(|p| *p != player);
        self.pointer -= before;

        // The pointer now sits on the entry that followed the removed one.
        if held_turn && !self.forward && !self.order.is_empty() {
            if self.pointer == 0 {
                self.pointer = self.order.len() - 1;
                self.turn += 1;
            } else {
                self.pointer -= 1;
            }
        } else {
            self.increment(0);
        }
        len - self.order.len()
    }

    /// The single distinct player left in the order, if there is one.
    pub fn sole_survivor(&self) -> Option<PlayerId> {
        let first = *self.order.first()?;
        self.order.iter().all(|p| *p == first).then_some(first)
    }
}
