//! Players and the per-game player roster.
//!
//! ## PlayerId
//!
//! Type-safe index into a `Roster`, supporting up to 255 players. Index 0 is
//! always the reserved `base` player, which owns every empty square.
//!
//! ## Roster
//!
//! `Vec`-backed storage with O(1) access by `PlayerId`, plus lookup by the
//! string id used in scenario files.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::coord::Transform;
use crate::board::Piece;

/// Id of the reserved player that owns empty squares.
pub const BASE_PLAYER_ID: &str = "base";

/// Scenario shorthand reserved for the base player (and the empty piece type).
pub const BASE_SHORTHAND: char = '0';

/// Player identifier: an index into the game's `Roster`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The base player, present in every roster.
    pub const BASE: PlayerId = PlayerId(0);

    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw roster index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Is this the reserved base player?
    #[must_use]
    pub const fn is_base(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Compass direction a player faces. Orients the movement rules of the
/// player's pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayDirection {
    #[default]
    #[serde(alias = "north")]
    North,
    #[serde(alias = "east")]
    East,
    #[serde(alias = "south")]
    South,
    #[serde(alias = "west")]
    West,
    #[serde(alias = "nowhere")]
    Nowhere,
}

impl PlayDirection {
    /// Rotation applied to north-relative offsets.
    #[must_use]
    pub const fn transform(self) -> Transform {
        match self {
            PlayDirection::North => Transform::NORTH,
            PlayDirection::East => Transform::EAST,
            PlayDirection::South => Transform::SOUTH,
            PlayDirection::West => Transform::WEST,
            PlayDirection::Nowhere => Transform::NOWHERE,
        }
    }
}

/// A participant in the game.
#[derive(Clone, Debug)]
pub struct Player {
    id: String,
    name: String,
    shorthand: char,
    user_controlled: bool,
    has_lost: bool,
    eliminated: bool,
    color: String,
    play_direction: PlayDirection,
    gold: i64,
    gold_total_earned: i64,
    gold_total_spent: i64,
    vital_piece_count: i32,
    lost_pieces: Vector<Piece>,
    captured_pieces: Vector<Piece>,
}

impl Player {
    /// Create a player with default color, direction (north) and no gold.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, user_controlled: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shorthand: '?',
            user_controlled,
            has_lost: false,
            eliminated: false,
            color: "#000000".to_string(),
            play_direction: PlayDirection::North,
            gold: 0,
            gold_total_earned: 0,
            gold_total_spent: 0,
            vital_piece_count: 0,
            lost_pieces: Vector::new(),
            captured_pieces: Vector::new(),
        }
    }

    /// The reserved player owning every empty square.
    #[must_use]
    pub fn base() -> Self {
        Self::new(BASE_PLAYER_ID, "Game", false)
            .with_shorthand(BASE_SHORTHAND)
            .with_play_direction(PlayDirection::Nowhere)
    }

    #[must_use]
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = shorthand;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_play_direction(mut self, direction: PlayDirection) -> Self {
        self.play_direction = direction;
        self
    }

    /// Set the starting balance. Does not count towards lifetime earnings.
    #[must_use]
    pub fn with_gold(mut self, gold: i64) -> Self {
        self.gold = gold;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenario shorthand identifier for this player.
    pub fn shorthand(&self) -> char {
        self.shorthand
    }

    pub fn is_user_controlled(&self) -> bool {
        self.user_controlled
    }

    pub fn has_lost(&self) -> bool {
        self.has_lost
    }

    /// Has this player been removed from the play order?
    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn play_direction(&self) -> PlayDirection {
        self.play_direction
    }

    pub fn gold(&self) -> i64 {
        self.gold
    }

    pub fn gold_total_earned(&self) -> i64 {
        self.gold_total_earned
    }

    pub fn gold_total_spent(&self) -> i64 {
        self.gold_total_spent
    }

    pub fn vital_piece_count(&self) -> i32 {
        self.vital_piece_count
    }

    /// Pieces this player has had captured or destroyed.
    pub fn lost_pieces(&self) -> &Vector<Piece> {
        &self.lost_pieces
    }

    /// Pieces this player has captured from others.
    pub fn captured_pieces(&self) -> &Vector<Piece> {
        &self.captured_pieces
    }

    /// Adjust the balance. Positive amounts count as earned, negative as
    /// spent. Negative balances are allowed.
    pub fn add_gold(&mut self, amount: i64) {
        self.gold += amount;
        if amount >= 0 {
            self.gold_total_earned += amount;
        } else {
            self.gold_total_spent -= amount;
        }
    }

    /// Adjust the number of vital pieces remaining. Reaching exactly zero
    /// means this player has lost, permanently.
    pub fn add_vital_piece_count(&mut self, delta: i32) {
        self.vital_piece_count += delta;
        if self.vital_piece_count == 0 {
            self.has_lost = true;
        }
    }

    pub fn add_lost_piece(&mut self, piece: Piece) {
        self.lost_pieces.push_back(piece);
    }

    pub fn add_captured_piece(&mut self, piece: Piece) {
        self.captured_pieces.push_back(piece);
    }

    /// Hand the player over to the engine. No-op unless the player has lost.
    pub fn disable_user_control(&mut self) {
        if self.has_lost {
            self.user_controlled = false;
        }
    }

    pub(crate) fn mark_eliminated(&mut self) {
        self.eliminated = true;
    }
}

/// All players of a game, indexed by `PlayerId`.
///
/// The base player always occupies `PlayerId::BASE`.
///
/// ## Example
///
/// ```
/// use rust_gridrules::core::{Player, PlayerId, Roster};
///
/// let mut roster = Roster::new();
/// let white = roster.insert(Player::new("white", "White", true)).unwrap();
///
/// assert_eq!(roster.len(), 2);
/// assert_eq!(roster[white].name(), "White");
/// assert_eq!(roster.find("base"), Some(PlayerId::BASE));
/// ```
#[derive(Clone, Debug)]
pub struct Roster {
    players: Vec<Player>,
    by_id: FxHashMap<String, PlayerId>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create a roster holding only the base player.
    #[must_use]
    pub fn new() -> Self {
        let mut by_id = FxHashMap::default();
        by_id.insert(BASE_PLAYER_ID.to_string(), PlayerId::BASE);
        Self {
            players: vec![Player::base()],
            by_id,
        }
    }

    /// Add a player. Returns `None` if the id is taken or the roster is full.
    pub fn insert(&mut self, player: Player) -> Option<PlayerId> {
        if self.by_id.contains_key(player.id()) || self.players.len() > u8::MAX as usize {
            return None;
        }
        let id = PlayerId(self.players.len() as u8);
        self.by_id.insert(player.id().to_string(), id);
        self.players.push(player);
        Some(id)
    }

    /// Look up a player handle by string id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<PlayerId> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&Player> {
        self.players.get(player.index())
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(player.index())
    }

    /// Number of players, including base.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false: the base player is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterate over (PlayerId, &Player) pairs, base first.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &Player)> {
        self.players
            .iter()
            .enumerate()
            .map(|(i, p)| (PlayerId(i as u8), p))
    }

    /// Iterate over all player IDs, base first.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.players.len() as u8).map(PlayerId)
    }
}

impl Index<PlayerId> for Roster {
    type Output = Player;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.players[player.index()]
    }
}

impl IndexMut<PlayerId> for Roster {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.players[player.index()]
    }
}
